//! Application state shared by every handler

use eventflyer_core::Config;
use eventflyer_db::EventRepository;
use eventflyer_processing::UploadOrchestrator;
use eventflyer_storage::Storage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub events: Arc<dyn EventRepository>,
    pub storage: Arc<dyn Storage>,
    pub uploads: Arc<UploadOrchestrator>,
}
