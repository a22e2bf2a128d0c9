use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}

/// Public entry: build the app and run the HTTP server.
///
/// Expects `.env`, logging and `cfg` to be set up by the caller.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = cfg
        .server
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address {}: {e}", cfg.server.bind_addr())))?;
    common::env::ensure_env(&cfg.database.url)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    // DB connection + schema
    let db = models::db::connect_and_migrate(&cfg.database).await?;
    let state = ServerState::new(db);

    let app: Router = routes::build_router(state, build_cors());

    info!(%addr, "starting todo api server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}
