use std::sync::Arc;

use axum::Router;
use mog_core::config::{AppConfig, ConfigError, LoadOptions};
use mog_core::{CommandParser, DesireLedger, RequestProcessor};
use mog_db::{connect_with_settings, migrations, DbPool, SqlDesireStore};
use mog_slack::{CommandRouter, SlackApiError, SlackEmojiOracle};
use thiserror::Error;
use tracing::info;

use crate::{health, slash};

pub type SlackCommands = CommandRouter<SqlDesireStore, SlackEmojiOracle>;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub commands: Arc<SlackCommands>,
}

impl Application {
    pub fn router(&self) -> Router {
        slash::router(self.commands.clone()).merge(health::router(self.db_pool.clone()))
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("emoji oracle setup failed: {0}")]
    Emoji(#[from] SlackApiError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let oracle = SlackEmojiOracle::from_config(&config)?;
    info!(
        event_name = "system.bootstrap.emoji_oracle_ready",
        correlation_id = "bootstrap",
        stock_emoji = oracle.stock().len(),
        custom_emoji_source = oracle.has_custom_source(),
        "emoji oracle ready"
    );

    let processor = RequestProcessor::new(
        CommandParser::new(config.slack.outgoing_token.clone()),
        DesireLedger::new(SqlDesireStore::new(db_pool.clone())),
        oracle,
    );

    Ok(Application { config, db_pool, commands: Arc::new(CommandRouter::new(processor)) })
}
