//! Test helpers: build AppState and router for integration tests.
//!
//! Events live in memory and uploads go to a temporary directory, so these tests
//! need neither Postgres nor an object store.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::TestServer;
use eventflyer_api::setup::{self, routes};
use eventflyer_api::state::AppState;
use eventflyer_core::Config;
use eventflyer_db::InMemoryEventRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_ADMIN_TOKEN: &str = "test-admin-token-0123456789";

/// Test application: server, state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub uploads_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of files written to the uploads directory
    pub fn stored_file_count(&self) -> usize {
        std::fs::read_dir(self.uploads_dir.path())
            .expect("Failed to read uploads directory")
            .count()
    }
}

/// Setup test app with in-memory events and local storage.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(&[]).await
}

/// Like [`setup_test_app`] with extra environment variables. An empty value unsets a default.
pub async fn setup_test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let uploads_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("ADMIN_TOKEN".to_string(), TEST_ADMIN_TOKEN.to_string());
    vars.insert(
        "UPLOADS_DIR".to_string(),
        uploads_dir.path().to_string_lossy().to_string(),
    );
    vars.insert("UPLOADS_BASE_URL".to_string(), "/uploads".to_string());
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("Invalid test config");

    let storage = setup::storage::setup_storage(&config)
        .await
        .expect("Failed to create local storage");
    let uploads = Arc::new(setup::build_upload_orchestrator(&config, storage.clone()));

    let state = Arc::new(AppState {
        config: config.clone(),
        events: Arc::new(InMemoryEventRepository::new()),
        storage,
        uploads,
    });

    let app = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        state,
        uploads_dir,
    }
}
