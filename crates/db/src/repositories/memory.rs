use tokio::sync::RwLock;

use mog_core::domain::desire::{Desire, DesireId, DesireStatus};
use mog_core::ledger::{DesireStore, StoreError};

#[derive(Default)]
struct DesireTable {
    next_id: i64,
    rows: Vec<Desire>,
}

/// Process-local desire store with the same semantics as [`super::SqlDesireStore`].
#[derive(Default)]
pub struct InMemoryDesireStore {
    table: RwLock<DesireTable>,
}

impl InMemoryDesireStore {
    pub async fn snapshot(&self) -> Vec<Desire> {
        self.table.read().await.rows.clone()
    }
}

fn is_pending_pair(desire: &Desire, emoji: &str, user: &str) -> bool {
    desire.is_pending() && desire.emoji == emoji && desire.user == user
}

#[async_trait::async_trait]
impl DesireStore for InMemoryDesireStore {
    async fn add_pending(&self, emoji: &str, user: &str) -> Result<bool, StoreError> {
        let mut table = self.table.write().await;
        if table.rows.iter().any(|desire| is_pending_pair(desire, emoji, user)) {
            return Ok(false);
        }

        table.next_id += 1;
        let id = DesireId(table.next_id);
        table.rows.push(Desire {
            id,
            emoji: emoji.to_owned(),
            user: user.to_owned(),
            status: DesireStatus::Pending,
        });
        Ok(true)
    }

    async fn remove_pending(&self, emoji: &str, user: &str) -> Result<u64, StoreError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|desire| !is_pending_pair(desire, emoji, user));
        Ok((before - table.rows.len()) as u64)
    }

    async fn complete_all(&self, emoji: &str) -> Result<u64, StoreError> {
        let mut table = self.table.write().await;
        let mut touched = 0;
        for desire in table.rows.iter_mut().filter(|desire| desire.emoji == emoji) {
            desire.fulfill();
            touched += 1;
        }
        Ok(touched)
    }

    async fn list_by_status(&self, status: DesireStatus) -> Result<Vec<Desire>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().filter(|desire| desire.status == status).cloned().collect())
    }

    async fn users_for(
        &self,
        emoji: &str,
        status: DesireStatus,
    ) -> Result<Vec<String>, StoreError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|desire| desire.emoji == emoji && desire.status == status)
            .map(|desire| desire.user.clone())
            .collect())
    }

    async fn emoji_for(
        &self,
        user: &str,
        status: DesireStatus,
    ) -> Result<Vec<String>, StoreError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|desire| desire.user == user && desire.status == status)
            .map(|desire| desire.emoji.clone())
            .collect())
    }

    async fn has_pending(&self, emoji: &str, user: &str) -> Result<bool, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().any(|desire| is_pending_pair(desire, emoji, user)))
    }
}
