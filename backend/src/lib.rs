//! # Mini Projects Backend
//!
//! Non-UI logic for the futuristic mini projects app: a student profile,
//! a calculator, a student grade system and a bank management system, all
//! backed by one persisted state store.
//!
//! ## Architecture
//!
//! ```text
//! UI (any HTTP client)
//!     ↓
//! IO Layer (REST API, axum handlers)
//!     ↓
//! Domain Layer (ConfigStore, StoreService, grading, bank rules)
//!     ↓
//! Storage Layer (SnapshotStorage: JSON file or memory)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::StoreService;
use crate::io::rest;
use crate::storage::{JsonConnection, JsonSnapshotRepository, SnapshotStorage};

/// Main application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub store_service: StoreService,
    pub config: Arc<AppConfig>,
}

/// Initialize the backend with file storage in the configured data directory
pub fn initialize_backend(config: AppConfig) -> Result<AppState> {
    info!("Setting up storage in {}", config.data_dir.display());
    let connection = JsonConnection::new(&config.data_dir)?;
    let storage = Arc::new(JsonSnapshotRepository::new(connection));

    Ok(initialize_backend_with_storage(config, storage))
}

/// Initialize the backend on top of an arbitrary snapshot storage
pub fn initialize_backend_with_storage(config: AppConfig, storage: Arc<dyn SnapshotStorage>) -> AppState {
    info!("Restoring application state");
    let store_service = StoreService::open(storage, config.store_options());

    AppState {
        store_service,
        config: Arc::new(config),
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let origin = match HeaderValue::from_str(&app_state.config.cors_origin) {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(e) => {
            warn!("Ignoring invalid CORS origin '{}': {}", app_state.config.cors_origin, e);
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .merge(rest::state_apis::router())
        .merge(rest::profile_apis::router())
        .merge(rest::logging_apis::router())
        .nest("/calculator", rest::calculator_apis::router())
        .nest("/grades", rest::grade_apis::router())
        .nest("/bank", rest::bank_apis::router())
        .nest("/data", rest::data_apis::router());

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
