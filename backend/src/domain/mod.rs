//! # Domain Layer
//!
//! Business rules for the profile, calculator, grade system and bank system.
//! `ConfigStore` holds the state and is the only mutation surface;
//! `StoreService` couples it with durable storage.

pub mod bank;
pub mod calculator;
pub mod config_store;
pub mod error;
pub mod grading;
pub mod import_export;
pub mod snapshot;
pub mod store_service;

pub use calculator::Operator;
pub use config_store::{ConfigStore, DEFAULT_HISTORY_LIMIT};
pub use error::StoreError;
pub use import_export::ImportPayload;
pub use store_service::{ExportFile, StoreOptions, StoreService, DEFAULT_STORAGE_KEY};
