use std::time::Duration;

use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

fn is_in_memory(cfg: &DatabaseConfig) -> bool {
    cfg.is_sqlite() && cfg.url.contains(":memory:")
}

/// Build a pool from configuration.
///
/// An in-memory SQLite database lives inside a single connection, so the pool
/// is pinned to one connection that is never recycled.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    if is_in_memory(cfg) {
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs));
    }
    let db = Database::connect(opt).await?;
    info!(backend = ?db.get_database_backend(), "database connected");
    Ok(db)
}

/// Connect and bring the schema up to date.
pub async fn connect_and_migrate(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db = connect_with_config(cfg).await?;
    migration::Migrator::up(&db, None).await?;
    info!("database migrations applied");
    Ok(db)
}
