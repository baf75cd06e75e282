//! Storage setup and initialization

use anyhow::{Context, Result};
use eventflyer_core::Config;
use eventflyer_storage::{create_storage, Storage};
use std::sync::Arc;

/// Build the storage backend selected by configuration.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config.storage())
        .await
        .context("Failed to initialize storage")?;
    tracing::info!(
        backend = %storage.backend_type(),
        "Storage initialized successfully"
    );
    Ok(storage)
}
