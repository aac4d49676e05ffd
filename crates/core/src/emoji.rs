use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("emoji lookup timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("emoji lookup request failed: {0}")]
    Request(String),
    #[error("chat platform rejected emoji lookup: {0}")]
    Api(String),
    #[error("stock emoji list could not be loaded: {0}")]
    StockList(String),
}

/// The set of emoji names that currently exist, stock and custom.
#[async_trait]
pub trait KnownEmojiOracle: Send + Sync {
    async fn list_known_emoji(&self) -> Result<HashSet<String>, OracleError>;
}

#[async_trait]
impl<O> KnownEmojiOracle for Arc<O>
where
    O: KnownEmojiOracle + ?Sized,
{
    async fn list_known_emoji(&self) -> Result<HashSet<String>, OracleError> {
        (**self).list_known_emoji().await
    }
}

/// Fixed emoji set; never fails.
#[derive(Clone, Debug, Default)]
pub struct StaticEmojiOracle {
    emoji: HashSet<String>,
}

impl StaticEmojiOracle {
    pub fn new<I, T>(emoji: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self { emoji: emoji.into_iter().map(Into::into).collect() }
    }

    pub fn insert(&mut self, emoji: impl Into<String>) {
        self.emoji.insert(emoji.into());
    }
}

#[async_trait]
impl KnownEmojiOracle for StaticEmojiOracle {
    async fn list_known_emoji(&self) -> Result<HashSet<String>, OracleError> {
        Ok(self.emoji.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{KnownEmojiOracle, StaticEmojiOracle};

    #[tokio::test]
    async fn static_oracle_reports_its_emoji() {
        let mut oracle = StaticEmojiOracle::new(["smile", "rage4"]);
        oracle.insert("chopz");

        let known = Arc::new(oracle).list_known_emoji().await.expect("static oracle");
        assert_eq!(known.len(), 3);
        assert!(known.contains("chopz"));
        assert!(!known.contains("kunk"));
    }
}
