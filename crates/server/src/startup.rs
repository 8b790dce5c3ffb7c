use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::env::check_readable;
use configs::AppConfig;
use service::storage::JsonFileStore;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the grades file named in the config, seeding it when allowed.
pub async fn open_store(cfg: &AppConfig) -> Result<JsonFileStore, StartupError> {
    let path = cfg.storage.grades_file.clone();
    let store = if cfg.storage.create_if_missing {
        JsonFileStore::open_or_create(path)
            .await
            .map_err(|e| StartupError::Storage(e.to_string()))?
    } else {
        JsonFileStore::new(path)
    };
    Ok(store)
}

/// Build the app from config: store, state, router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let store = open_store(cfg).await?;
    let state = AppState::new(Arc::new(store));
    Ok(routes::build_router(state, build_cors()))
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = cfg
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("{}: {}", cfg.bind_addr(), e)))?;
    let app = build_app(&cfg).await?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let grades_file = cfg.storage.grades_file.display().to_string();
    if check_readable(&cfg.storage.grades_file).await {
        info!(%addr, %grades_file, "grades api started");
    } else {
        error!(%addr, %grades_file, "grades api started but the grades file cannot be read");
    }
    axum::serve(listener, app).await?;
    Ok(())
}
