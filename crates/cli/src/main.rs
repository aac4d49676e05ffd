use std::process::ExitCode;

fn main() -> ExitCode {
    mog_cli::run()
}
