use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::run_pending;
    use crate::{connect_with_settings, migrations::MIGRATOR};

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "desires",
        "idx_desires_status_emoji",
        "idx_desires_user_status",
        "idx_desires_pending_unique",
    ];

    #[tokio::test]
    async fn migrations_create_desire_schema() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        for object in MANAGED_SCHEMA_OBJECTS {
            let count = sqlx::query("SELECT COUNT(*) AS count FROM sqlite_master WHERE name = ?")
                .bind(object)
                .fetch_one(&pool)
                .await
                .expect("query sqlite_master")
                .get::<i64, _>("count");
            assert_eq!(count, 1, "expected schema object `{object}`");
        }

        let columns: Vec<String> = sqlx::query("SELECT name FROM pragma_table_info('desires')")
            .fetch_all(&pool)
            .await
            .expect("table info")
            .iter()
            .map(|row| row.get::<String, _>("name"))
            .collect();
        assert_eq!(columns, vec!["id", "emoji", "user", "status"]);

        pool.close().await;
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run");

        let applied = sqlx::query("SELECT COUNT(*) AS count FROM _sqlx_migrations")
            .fetch_one(&pool)
            .await
            .expect("migration ledger")
            .get::<i64, _>("count");
        assert_eq!(applied as usize, MIGRATOR.iter().count());

        pool.close().await;
    }
}
