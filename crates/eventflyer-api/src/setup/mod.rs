//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use eventflyer_core::Config;
use eventflyer_db::create_event_repository;
use eventflyer_processing::{UploadLimits, UploadOrchestrator};
use std::sync::Arc;
use std::time::Duration;

/// Build the upload orchestrator from configured limits.
pub fn build_upload_orchestrator(
    config: &Config,
    storage: Arc<dyn eventflyer_storage::Storage>,
) -> UploadOrchestrator {
    let limits = UploadLimits {
        max_file_size: config.max_file_size_bytes(),
        max_image_dimension: config.max_image_dimension(),
    };
    UploadOrchestrator::new(storage, limits)
        .with_storage_timeout(Duration::from_secs(config.storage_timeout_secs()))
}

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format(), config.environment())?;

    tracing::info!(
        environment = %config.environment(),
        storage = %config.storage_backend(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let events = create_event_repository(pool);

    let storage = storage::setup_storage(&config).await?;
    let uploads = Arc::new(build_upload_orchestrator(&config, storage.clone()));

    let state = Arc::new(AppState {
        config: config.clone(),
        events,
        storage,
        uploads,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
