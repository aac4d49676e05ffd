pub mod desire;
