//! Desire ledger: the storage port plus the aggregate views built on top of it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::desire::{Desire, DesireStatus};
use crate::errors::DomainError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("desire store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Persistence operations over `desires` rows.
///
/// Every listing returns rows in insertion order.
#[async_trait]
pub trait DesireStore: Send + Sync {
    /// Inserts a pending desire. Returns `false` when the store already holds a
    /// pending desire for the pair and nothing was written.
    async fn add_pending(&self, emoji: &str, user: &str) -> Result<bool, StoreError>;

    /// Removes the pending desire for the pair. Fulfilled rows are left untouched.
    async fn remove_pending(&self, emoji: &str, user: &str) -> Result<u64, StoreError>;

    /// Marks every desire for `emoji` fulfilled, whatever its current status.
    async fn complete_all(&self, emoji: &str) -> Result<u64, StoreError>;

    async fn list_by_status(&self, status: DesireStatus) -> Result<Vec<Desire>, StoreError>;

    async fn users_for(&self, emoji: &str, status: DesireStatus)
        -> Result<Vec<String>, StoreError>;

    async fn emoji_for(&self, user: &str, status: DesireStatus)
        -> Result<Vec<String>, StoreError>;

    async fn has_pending(&self, emoji: &str, user: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S> DesireStore for Arc<S>
where
    S: DesireStore + ?Sized,
{
    async fn add_pending(&self, emoji: &str, user: &str) -> Result<bool, StoreError> {
        (**self).add_pending(emoji, user).await
    }

    async fn remove_pending(&self, emoji: &str, user: &str) -> Result<u64, StoreError> {
        (**self).remove_pending(emoji, user).await
    }

    async fn complete_all(&self, emoji: &str) -> Result<u64, StoreError> {
        (**self).complete_all(emoji).await
    }

    async fn list_by_status(&self, status: DesireStatus) -> Result<Vec<Desire>, StoreError> {
        (**self).list_by_status(status).await
    }

    async fn users_for(
        &self,
        emoji: &str,
        status: DesireStatus,
    ) -> Result<Vec<String>, StoreError> {
        (**self).users_for(emoji, status).await
    }

    async fn emoji_for(
        &self,
        user: &str,
        status: DesireStatus,
    ) -> Result<Vec<String>, StoreError> {
        (**self).emoji_for(user, status).await
    }

    async fn has_pending(&self, emoji: &str, user: &str) -> Result<bool, StoreError> {
        (**self).has_pending(emoji, user).await
    }
}

/// One emoji and everyone who asked for it, in request order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiDemand {
    pub emoji: String,
    pub users: Vec<String>,
}

impl EmojiDemand {
    pub fn requester_count(&self) -> usize {
        self.users.len()
    }
}

pub struct DesireLedger<S> {
    store: S,
}

impl<S> DesireLedger<S>
where
    S: DesireStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn add_pending(&self, emoji: &str, user: &str) -> Result<bool, StoreError> {
        self.store.add_pending(emoji, user).await
    }

    pub async fn remove_pending(&self, emoji: &str, user: &str) -> Result<u64, StoreError> {
        self.store.remove_pending(emoji, user).await
    }

    pub async fn complete_all(&self, emoji: &str) -> Result<u64, StoreError> {
        self.store.complete_all(emoji).await
    }

    pub async fn has_pending(&self, emoji: &str, user: &str) -> Result<bool, StoreError> {
        self.store.has_pending(emoji, user).await
    }

    pub async fn users_for(
        &self,
        emoji: &str,
        status: DesireStatus,
    ) -> Result<Vec<String>, StoreError> {
        self.store.users_for(emoji, status).await
    }

    pub async fn emoji_for(
        &self,
        user: &str,
        status: DesireStatus,
    ) -> Result<Vec<String>, StoreError> {
        self.store.emoji_for(user, status).await
    }

    /// Distinct pending emoji, ordered by their first request.
    pub async fn distinct_pending_emoji(&self) -> Result<Vec<String>, StoreError> {
        let grouped = self.grouped_by_emoji(DesireStatus::Pending).await?;
        Ok(grouped.into_iter().map(|demand| demand.emoji).collect())
    }

    pub async fn count_distinct_pending(&self) -> Result<usize, StoreError> {
        Ok(self.grouped_by_emoji(DesireStatus::Pending).await?.len())
    }

    /// Desires with `status` grouped per emoji, ordered by each emoji's first request.
    pub async fn grouped_by_emoji(
        &self,
        status: DesireStatus,
    ) -> Result<Vec<EmojiDemand>, StoreError> {
        let desires = self.store.list_by_status(status).await?;
        Ok(group_desires(desires))
    }

    /// Emoji ranked by descending requester count. Ties keep first-request order.
    pub async fn popularity(&self, status: DesireStatus) -> Result<Vec<EmojiDemand>, StoreError> {
        let mut grouped = self.grouped_by_emoji(status).await?;
        rank_by_popularity(&mut grouped);
        Ok(grouped)
    }
}

pub fn group_desires(desires: impl IntoIterator<Item = Desire>) -> Vec<EmojiDemand> {
    let mut grouped: Vec<EmojiDemand> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for desire in desires {
        match positions.get(&desire.emoji) {
            Some(&index) => grouped[index].users.push(desire.user),
            None => {
                positions.insert(desire.emoji.clone(), grouped.len());
                grouped.push(EmojiDemand { emoji: desire.emoji, users: vec![desire.user] });
            }
        }
    }

    grouped
}

pub fn rank_by_popularity(demands: &mut [EmojiDemand]) {
    // sort_by is stable, so equal counts stay in first-request order.
    demands.sort_by(|left, right| right.requester_count().cmp(&left.requester_count()));
}

#[cfg(test)]
mod tests {
    use crate::domain::desire::{Desire, DesireId, DesireStatus};

    use super::{group_desires, rank_by_popularity, EmojiDemand};

    fn desire(id: i64, emoji: &str, user: &str) -> Desire {
        Desire {
            id: DesireId(id),
            emoji: emoji.to_string(),
            user: user.to_string(),
            status: DesireStatus::Pending,
        }
    }

    #[test]
    fn groups_preserve_first_request_order_and_user_order() {
        let grouped = group_desires(vec![
            desire(1, "chopz", "powerlanguage"),
            desire(2, "chopz", "codhand"),
            desire(3, "biff", "tonyhat"),
            desire(4, "chopz", "tonyhat"),
        ]);

        assert_eq!(
            grouped,
            vec![
                EmojiDemand {
                    emoji: "chopz".to_string(),
                    users: vec![
                        "powerlanguage".to_string(),
                        "codhand".to_string(),
                        "tonyhat".to_string()
                    ],
                },
                EmojiDemand { emoji: "biff".to_string(), users: vec!["tonyhat".to_string()] },
            ]
        );
    }

    #[test]
    fn ranking_orders_by_descending_requester_count() {
        let mut grouped = group_desires(vec![
            desire(1, "chopz", "powerlanguage"),
            desire(2, "chopz", "codhand"),
            desire(3, "biff", "tonyhat"),
            desire(4, "chopz", "tonyhat"),
            desire(5, "kunk", "user_blep"),
            desire(6, "kunk", "user_heh"),
            desire(7, "kunk", "user_jef"),
            desire(8, "kunk", "user_feg"),
        ]);
        rank_by_popularity(&mut grouped);

        let order: Vec<_> = grouped.iter().map(|demand| demand.emoji.as_str()).collect();
        assert_eq!(order, vec!["kunk", "chopz", "biff"]);
    }

    #[test]
    fn ranking_ties_keep_first_request_order() {
        let mut grouped = group_desires(vec![
            desire(1, "zebra", "a"),
            desire(2, "apple", "b"),
            desire(3, "mango", "c"),
            desire(4, "mango", "d"),
        ]);
        rank_by_popularity(&mut grouped);

        let order: Vec<_> = grouped.iter().map(|demand| demand.emoji.as_str()).collect();
        assert_eq!(order, vec!["mango", "zebra", "apple"]);
    }

    #[test]
    fn grouping_nothing_yields_nothing() {
        assert!(group_desires(Vec::new()).is_empty());
    }
}
