
use anyhow::Result;
use configs::DatabaseConfig;
use sea_orm::DatabaseConnection;

/// Fresh, migrated in-memory database per test.
pub(crate) async fn setup_test_db() -> Result<DatabaseConnection> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
    crate::db::connect_and_migrate(&cfg).await
}
