pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "mog",
    about = "Mog operator CLI",
    long_about = "Operate the Mog emoji request board: migrations, readiness checks, config inspection, and manual fulfilment.",
    after_help = "Examples:\n  mog doctor --json\n  mog config\n  mog complete partyparrot"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, Slack tokens, stock emoji list, and DB connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Mark every desire for an emoji as fulfilled")]
    Complete {
        #[arg(help = "Emoji name, with or without surrounding colons")]
        emoji: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Complete { emoji } => commands::complete::run(&emoji),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
