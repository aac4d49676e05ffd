use sqlx::Row;

use mog_core::domain::desire::{Desire, DesireId, DesireStatus};
use mog_core::ledger::{DesireStore, StoreError};

use super::RepositoryError;
use crate::DbPool;

pub struct SqlDesireStore {
    pool: DbPool,
}

impl SqlDesireStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn row_to_desire(row: &sqlx::sqlite::SqliteRow) -> Result<Desire, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let emoji: String = row.try_get("emoji").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let user: String = row.try_get("user").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_code: i64 =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status =
        DesireStatus::from_code(status_code).map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Desire { id: DesireId(id), emoji, user, status })
}

#[async_trait::async_trait]
impl DesireStore for SqlDesireStore {
    async fn add_pending(&self, emoji: &str, user: &str) -> Result<bool, StoreError> {
        // The partial unique index turns a duplicate pending pair into a no-op.
        let result = sqlx::query(
            "INSERT OR IGNORE INTO desires (emoji, user, status) VALUES (?, ?, ?)",
        )
        .bind(emoji)
        .bind(user)
        .bind(DesireStatus::Pending.as_code())
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_pending(&self, emoji: &str, user: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM desires WHERE emoji = ? AND user = ? AND status = ?")
            .bind(emoji)
            .bind(user)
            .bind(DesireStatus::Pending.as_code())
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(result.rows_affected())
    }

    async fn complete_all(&self, emoji: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE desires SET status = ? WHERE emoji = ?")
            .bind(DesireStatus::Fulfilled.as_code())
            .bind(emoji)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(result.rows_affected())
    }

    async fn list_by_status(&self, status: DesireStatus) -> Result<Vec<Desire>, StoreError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT id, emoji, user, status FROM desires WHERE status = ? ORDER BY id ASC",
        )
        .bind(status.as_code())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let desires = rows.iter().map(row_to_desire).collect::<Result<Vec<_>, _>>()?;
        Ok(desires)
    }

    async fn users_for(
        &self,
        emoji: &str,
        status: DesireStatus,
    ) -> Result<Vec<String>, StoreError> {
        let users = sqlx::query_scalar::<_, String>(
            "SELECT user FROM desires WHERE emoji = ? AND status = ? ORDER BY id ASC",
        )
        .bind(emoji)
        .bind(status.as_code())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(users)
    }

    async fn emoji_for(
        &self,
        user: &str,
        status: DesireStatus,
    ) -> Result<Vec<String>, StoreError> {
        let emoji = sqlx::query_scalar::<_, String>(
            "SELECT emoji FROM desires WHERE user = ? AND status = ? ORDER BY id ASC",
        )
        .bind(user)
        .bind(status.as_code())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(emoji)
    }

    async fn has_pending(&self, emoji: &str, user: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM desires WHERE emoji = ? AND user = ? AND status = ?)",
        )
        .bind(emoji)
        .bind(user)
        .bind(DesireStatus::Pending.as_code())
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(exists != 0)
    }
}

#[cfg(test)]
mod tests {
    use mog_core::domain::desire::DesireStatus;
    use mog_core::ledger::{DesireStore, StoreError};

    use super::SqlDesireStore;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlDesireStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlDesireStore::new(pool)
    }

    #[tokio::test]
    async fn add_then_has_pending_then_remove() {
        let store = setup().await;

        assert!(store.add_pending("chopz", "powerlanguage").await.expect("add"));
        assert!(store.has_pending("chopz", "powerlanguage").await.expect("has"));
        assert!(!store.has_pending("chopz", "codhand").await.expect("other user"));

        assert_eq!(store.remove_pending("chopz", "powerlanguage").await.expect("remove"), 1);
        assert!(!store.has_pending("chopz", "powerlanguage").await.expect("has after remove"));
    }

    #[tokio::test]
    async fn unique_index_blocks_second_pending_row_for_same_pair() {
        let store = setup().await;

        assert!(store.add_pending("chopz", "powerlanguage").await.expect("first add"));
        assert!(!store.add_pending("chopz", "powerlanguage").await.expect("second add"));

        let pending = store.list_by_status(DesireStatus::Pending).await.expect("list");
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn complete_all_is_idempotent_and_frees_the_pair() {
        let store = setup().await;
        store.add_pending("chopz", "powerlanguage").await.expect("add");
        store.add_pending("chopz", "codhand").await.expect("add");
        store.add_pending("biff", "tonyhat").await.expect("add");

        assert_eq!(store.complete_all("chopz").await.expect("complete"), 2);
        let after_first = store.list_by_status(DesireStatus::Fulfilled).await.expect("list");
        store.complete_all("chopz").await.expect("complete again");
        let after_second = store.list_by_status(DesireStatus::Fulfilled).await.expect("list");
        assert_eq!(after_first, after_second);

        // A fulfilled row does not count against the pending uniqueness rule.
        assert!(store.add_pending("chopz", "powerlanguage").await.expect("re-add"));
    }

    #[tokio::test]
    async fn remove_pending_leaves_fulfilled_rows_alone() {
        let store = setup().await;
        store.add_pending("chopz", "powerlanguage").await.expect("add");
        store.complete_all("chopz").await.expect("complete");
        store.add_pending("chopz", "powerlanguage").await.expect("re-add");

        assert_eq!(store.remove_pending("chopz", "powerlanguage").await.expect("remove"), 1);

        let fulfilled = store.users_for("chopz", DesireStatus::Fulfilled).await.expect("users");
        assert_eq!(fulfilled, vec!["powerlanguage".to_string()]);
    }

    #[tokio::test]
    async fn listings_follow_insertion_order() {
        let store = setup().await;
        store.add_pending("kunk", "user_feg").await.expect("add");
        store.add_pending("chopz", "user_feg").await.expect("add");
        store.add_pending("kunk", "user_blep").await.expect("add");

        assert_eq!(
            store.users_for("kunk", DesireStatus::Pending).await.expect("users"),
            vec!["user_feg".to_string(), "user_blep".to_string()]
        );
        assert_eq!(
            store.emoji_for("user_feg", DesireStatus::Pending).await.expect("emoji"),
            vec!["kunk".to_string(), "chopz".to_string()]
        );

        let ids: Vec<i64> = store
            .list_by_status(DesireStatus::Pending)
            .await
            .expect("list")
            .iter()
            .map(|desire| desire.id.0)
            .collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn closed_pool_surfaces_as_unavailable() {
        let store = setup().await;
        store.pool().close().await;

        let error = store.has_pending("chopz", "powerlanguage").await.expect_err("closed pool");
        assert!(matches!(error, StoreError::Unavailable(_)));
    }
}
