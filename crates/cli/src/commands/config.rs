use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use mog_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct Field {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in effective_fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn effective_fields(config: &AppConfig) -> Vec<Field> {
    let access_token = config
        .slack
        .access_token
        .as_ref()
        .map(|token| redact_token(token.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    let stock_list_path = config
        .emoji
        .stock_list_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<bundled>".to_string());

    vec![
        Field {
            key: "database.url",
            env_keys: &["MOG_DATABASE_URL"],
            value: config.database.url.clone(),
        },
        Field {
            key: "database.max_connections",
            env_keys: &["MOG_DATABASE_MAX_CONNECTIONS"],
            value: config.database.max_connections.to_string(),
        },
        Field {
            key: "database.timeout_secs",
            env_keys: &["MOG_DATABASE_TIMEOUT_SECS"],
            value: config.database.timeout_secs.to_string(),
        },
        Field {
            key: "slack.outgoing_token",
            env_keys: &["MOG_SLACK_OUTGOING_TOKEN"],
            value: redact_token(config.slack.outgoing_token.expose_secret()),
        },
        Field { key: "slack.access_token", env_keys: &["MOG_SLACK_ACCESS_TOKEN"], value: access_token },
        Field {
            key: "slack.api_base_url",
            env_keys: &["MOG_SLACK_API_BASE_URL"],
            value: config.slack.api_base_url.clone(),
        },
        Field {
            key: "emoji.stock_list_path",
            env_keys: &["MOG_EMOJI_STOCK_LIST_PATH"],
            value: stock_list_path,
        },
        Field {
            key: "emoji.timeout_secs",
            env_keys: &["MOG_EMOJI_TIMEOUT_SECS"],
            value: config.emoji.timeout_secs.to_string(),
        },
        Field {
            key: "server.bind_address",
            env_keys: &["MOG_SERVER_BIND_ADDRESS"],
            value: config.server.bind_address.clone(),
        },
        Field {
            key: "server.port",
            env_keys: &["MOG_SERVER_PORT"],
            value: config.server.port.to_string(),
        },
        Field {
            key: "logging.level",
            env_keys: &["MOG_LOGGING_LEVEL", "MOG_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key: "logging.format",
            env_keys: &["MOG_LOGGING_FORMAT", "MOG_LOG_FORMAT"],
            value: config.logging.format.as_str().to_string(),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("mog.toml"), PathBuf::from("config/mog.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps a Slack token's type prefix (`xoxb-`) and hides the rest.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
