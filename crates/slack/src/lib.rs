//! Slack integration for Mog
//!
//! - **Slash Commands** (`commands`) - form payload in, ephemeral JSON reply out
//! - **Emoji** (`emoji`) - stock alias catalog, `emoji.list` client, and the
//!   [`SlackEmojiOracle`] that tells the core which emoji already exist
//!
//! # Architecture
//!
//! ```text
//! POST / form → SlashCommandPayload → CommandRouter → RequestProcessor
//!                                                          ↓
//!               SlashResponse ← CommandReply     SlackEmojiOracle (stock ∪ custom)
//! ```

pub mod commands;
pub mod emoji;

pub use commands::{CommandRouter, SlashCommandPayload, SlashResponse};
pub use emoji::{SlackApiError, SlackEmojiClient, SlackEmojiOracle, StockEmojiCatalog};
