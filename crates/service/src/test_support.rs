#![cfg(test)]
use sea_orm::DatabaseConnection;
use configs::DatabaseConfig;
use models::db::connect_and_migrate;

/// Fresh in-memory database, migrated, for the current test.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
    let db = connect_and_migrate(&cfg).await?;
    Ok(db)
}
