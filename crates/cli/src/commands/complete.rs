use mog_core::command::is_valid_emoji_name;
use mog_core::DesireLedger;
use mog_db::{connect_with_settings, migrations, SqlDesireStore};

use crate::commands::{
    build_runtime, load_config, CommandResult, EXIT_DB_CONNECTIVITY, EXIT_INVALID_ARGUMENT,
    EXIT_STORE,
};

/// Operator counterpart of per-request reconciliation: fulfils every desire for
/// `emoji` without waiting for it to show up in Slack.
pub fn run(emoji: &str) -> CommandResult {
    let emoji = emoji.trim().trim_matches(':');
    if emoji.is_empty() || !is_valid_emoji_name(emoji) {
        return CommandResult::failure(
            "complete",
            "invalid_argument",
            format!("invalid emoji name `:{emoji}:`"),
            EXIT_INVALID_ARGUMENT,
        );
    }

    let config = match load_config("complete") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("complete") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), EXIT_STORE))?;

        let ledger = DesireLedger::new(SqlDesireStore::new(pool.clone()));
        let touched = ledger
            .complete_all(emoji)
            .await
            .map_err(|error| ("store", error.to_string(), EXIT_STORE))?;
        pool.close().await;
        Ok::<u64, (&'static str, String, u8)>(touched)
    });

    match result {
        Ok(touched) => CommandResult::success(
            "complete",
            format!("marked {touched} desire(s) for `:{emoji}:` as fulfilled"),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("complete", error_class, message, exit_code)
        }
    }
}
