//! # Store Service
//!
//! Application-lifecycle wrapper around `ConfigStore`. It restores the store
//! from durable storage at startup and writes a full snapshot after every
//! mutation.
//!
//! Each mutation runs against a copy of the store. The copy replaces the live
//! store only once its snapshot was saved, so a failed write surfaces as
//! `StoreError::Persistence` and leaves the observable state untouched.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info, warn};

use shared::{
    Account, AppSettings, AppSettingsPatch, CalculationEntry, ExportDocument, NewAccount,
    NewStudent, PersistedState, Student, StudentInfo, StudentInfoPatch, StudentPatch,
};

use super::calculator::Operator;
use super::config_store::{ConfigStore, DEFAULT_HISTORY_LIMIT};
use super::error::StoreError;
use super::import_export::{export_filename, render_export};
use super::snapshot::{self, SCHEMA_VERSION};
use crate::storage::SnapshotStorage;

pub const DEFAULT_STORAGE_KEY: &str = "futuristic-mini-projects-storage";

/// Where and how the snapshot is kept
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    pub storage_key: String,
    pub schema_version: u32,
    pub history_limit: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            schema_version: SCHEMA_VERSION,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// A rendered backup file ready to be downloaded
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub contents: String,
}

#[derive(Clone)]
pub struct StoreService {
    store: Arc<Mutex<ConfigStore>>,
    storage: Arc<dyn SnapshotStorage>,
    options: Arc<StoreOptions>,
}

impl StoreService {
    /// Restore the store from `storage`, falling back to defaults when no
    /// usable snapshot exists
    pub fn open(storage: Arc<dyn SnapshotStorage>, options: StoreOptions) -> Self {
        let state = match storage.load_snapshot(&options.storage_key) {
            Ok(Some(raw)) => match snapshot::decode(&raw, options.schema_version) {
                Some(state) => {
                    info!("Restored snapshot '{}'", options.storage_key);
                    state
                }
                None => PersistedState::default(),
            },
            Ok(None) => {
                info!("No snapshot '{}' yet, using defaults", options.storage_key);
                PersistedState::default()
            }
            Err(e) => {
                warn!("Failed to read snapshot '{}', using defaults: {:#}", options.storage_key, e);
                PersistedState::default()
            }
        };

        let store = ConfigStore::new(state).with_history_limit(options.history_limit);

        Self {
            store: Arc::new(Mutex::new(store)),
            storage,
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    fn lock(&self) -> MutexGuard<'_, ConfigStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, store: &ConfigStore) -> Result<(), StoreError> {
        let write = || -> Result<()> {
            let raw = snapshot::encode(store.state(), self.options.schema_version)?;
            self.storage
                .save_snapshot(&self.options.storage_key, &raw)
                .context("Failed to save snapshot")
        };

        write().map_err(|e| {
            error!("Persistence failure for '{}': {:#}", self.options.storage_key, e);
            StoreError::Persistence(format!("{:#}", e))
        })
    }

    /// Run `operation` against a copy of the store and commit it once the
    /// resulting snapshot is durable
    pub fn mutate<T>(
        &self,
        operation: impl FnOnce(&mut ConfigStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut live = self.lock();
        let mut next = live.clone();

        let value = operation(&mut next)?;
        self.persist(&next)?;

        *live = next;
        Ok(value)
    }

    /// Read from the live store
    pub fn read<T>(&self, reader: impl FnOnce(&ConfigStore) -> T) -> T {
        reader(&self.lock())
    }

    pub fn snapshot(&self) -> PersistedState {
        self.read(|store| store.state().clone())
    }

    // ---------------------------------------------------------------------
    // Profile and settings
    // ---------------------------------------------------------------------

    pub fn update_student_info(&self, patch: StudentInfoPatch) -> Result<StudentInfo, StoreError> {
        self.mutate(|store| Ok(store.update_student_info(patch).clone()))
    }

    pub fn update_app_settings(&self, patch: AppSettingsPatch) -> Result<AppSettings, StoreError> {
        self.mutate(|store| Ok(store.update_app_settings(patch).clone()))
    }

    // ---------------------------------------------------------------------
    // Calculator
    // ---------------------------------------------------------------------

    pub fn evaluate(&self, first: f64, second: f64, operator: &str) -> Result<CalculationEntry, StoreError> {
        let operator: Operator = operator.parse()?;
        self.mutate(|store| store.evaluate(first, second, operator))
    }

    pub fn add_calculator_history(&self, entry: CalculationEntry) -> Result<(), StoreError> {
        self.mutate(|store| {
            store.add_calculator_history(entry);
            Ok(())
        })
    }

    pub fn update_calculator_memory(&self, value: f64) -> Result<(), StoreError> {
        if !value.is_finite() {
            return Err(StoreError::InvalidAmount(format!("memory value {} is not finite", value)));
        }
        self.mutate(|store| {
            store.update_calculator_memory(value);
            Ok(())
        })
    }

    pub fn clear_calculator_history(&self) -> Result<(), StoreError> {
        self.mutate(|store| {
            store.clear_calculator_history();
            Ok(())
        })
    }

    // ---------------------------------------------------------------------
    // Grade system
    // ---------------------------------------------------------------------

    pub fn add_student(&self, request: NewStudent) -> Result<Student, StoreError> {
        self.mutate(|store| store.add_student(request))
    }

    pub fn update_student(&self, id: u64, patch: StudentPatch) -> Result<Option<Student>, StoreError> {
        self.mutate(|store| store.update_student(id, patch))
    }

    pub fn delete_student(&self, id: u64) -> Result<bool, StoreError> {
        self.mutate(|store| Ok(store.delete_student(id)))
    }

    // ---------------------------------------------------------------------
    // Bank system
    // ---------------------------------------------------------------------

    pub fn create_account(&self, request: NewAccount) -> Result<Account, StoreError> {
        self.mutate(|store| store.create_account(request))
    }

    pub fn update_account_balance(
        &self,
        account_id: &str,
        signed_amount: f64,
        transaction_type: &str,
        description: &str,
    ) -> Result<Option<Account>, StoreError> {
        self.mutate(|store| {
            store.update_account_balance(account_id, signed_amount, transaction_type, description)
        })
    }

    pub fn deposit(&self, account_id: &str, amount: f64) -> Result<Option<Account>, StoreError> {
        self.mutate(|store| store.deposit(account_id, amount))
    }

    pub fn withdraw(&self, account_id: &str, amount: f64) -> Result<Option<Account>, StoreError> {
        self.mutate(|store| store.withdraw(account_id, amount))
    }

    pub fn delete_account(&self, account_id: &str) -> Result<Option<Account>, StoreError> {
        self.mutate(|store| Ok(store.delete_account(account_id)))
    }

    // ---------------------------------------------------------------------
    // Whole-state operations
    // ---------------------------------------------------------------------

    pub fn reset_all_data(&self) -> Result<(), StoreError> {
        self.mutate(|store| {
            store.reset_all_data();
            Ok(())
        })
    }

    pub fn export_data(&self) -> ExportDocument {
        self.read(|store| store.export_data())
    }

    /// Backup document rendered for download, named after `app_name` and today
    pub fn export_file(&self, app_name: &str) -> Result<ExportFile> {
        let document = self.export_data();
        let contents = render_export(&document).context("Failed to render backup document")?;
        let filename = export_filename(app_name, Utc::now().date_naive());

        info!("Exported backup {} ({} bytes)", filename, contents.len());
        Ok(ExportFile { filename, contents })
    }

    /// Validate and adopt a backup document; returns the adopted section names
    pub fn import_json(&self, raw: &str) -> Result<Vec<&'static str>, StoreError> {
        self.mutate(|store| store.import_json(raw)).map_err(|e| {
            warn!("Import rejected: {}", e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonConnection, JsonSnapshotRepository, MemoryStorage};
    use tempfile::TempDir;

    fn service_with(storage: &MemoryStorage) -> StoreService {
        StoreService::open(Arc::new(storage.clone()), StoreOptions::default())
    }

    fn new_account(name: &str, balance: f64) -> NewAccount {
        NewAccount {
            name: name.to_string(),
            age: 21,
            phone: "555-0101".to_string(),
            balance,
        }
    }

    #[test]
    fn test_open_without_snapshot_uses_defaults() {
        let storage = MemoryStorage::new();
        let service = service_with(&storage);

        assert_eq!(service.snapshot(), PersistedState::default());
        assert_eq!(storage.raw(DEFAULT_STORAGE_KEY), None);
    }

    #[test]
    fn test_every_mutation_writes_a_snapshot() {
        let storage = MemoryStorage::new();
        let service = service_with(&storage);

        service.create_account(new_account("Alice", 100.0)).unwrap();
        let raw = storage.raw(DEFAULT_STORAGE_KEY).unwrap();
        let restored = snapshot::decode(&raw, SCHEMA_VERSION).unwrap();
        assert_eq!(restored.bank_system_data.accounts.len(), 1);

        service.deposit("ACC001", 50.0).unwrap();
        let raw = storage.raw(DEFAULT_STORAGE_KEY).unwrap();
        let restored = snapshot::decode(&raw, SCHEMA_VERSION).unwrap();
        assert_eq!(restored.bank_system_data.total_balance, 150.0);
    }

    #[test]
    fn test_state_survives_restart() {
        let storage = MemoryStorage::new();
        {
            let service = service_with(&storage);
            service
                .update_student_info(StudentInfoPatch {
                    name: Some("Ada".to_string()),
                    ..Default::default()
                })
                .unwrap();
            service.evaluate(2.0, 3.0, "+").unwrap();
            service
                .add_student(NewStudent { name: "S".to_string(), marks: [80; 5] })
                .unwrap();
        }

        let reopened = service_with(&storage);
        let state = reopened.snapshot();
        assert_eq!(state.student_info.name, "Ada");
        assert_eq!(state.calculator_data.history.len(), 1);
        assert_eq!(state.calculator_data.last_result, Some(5.0));
        assert_eq!(state.grade_system_data.students.len(), 1);
        assert_eq!(state.grade_system_data.students[0].evaluated_by, "Ada");
    }

    #[test]
    fn test_unreadable_snapshot_falls_back_to_defaults() {
        let storage = MemoryStorage::with_snapshot(DEFAULT_STORAGE_KEY, "{not json");
        let service = service_with(&storage);
        assert_eq!(service.snapshot(), PersistedState::default());
    }

    #[test]
    fn test_version_mismatch_falls_back_to_defaults() {
        let mut state = PersistedState::default();
        state.student_info.name = "Old".to_string();
        let raw = snapshot::encode(&state, 99).unwrap();

        let storage = MemoryStorage::with_snapshot(DEFAULT_STORAGE_KEY, &raw);
        let service = service_with(&storage);
        assert_eq!(service.snapshot().student_info.name, "");
    }

    #[test]
    fn test_persistence_failure_leaves_state_unchanged() {
        let storage = MemoryStorage::new();
        let service = service_with(&storage);
        service.create_account(new_account("Alice", 100.0)).unwrap();
        let before = service.snapshot();

        storage.set_failing(true);
        let result = service.deposit("ACC001", 25.0);
        assert!(matches!(result, Err(StoreError::Persistence(_))));
        assert_eq!(service.snapshot(), before);

        storage.set_failing(false);
        let account = service.deposit("ACC001", 25.0).unwrap().unwrap();
        assert_eq!(account.balance, 125.0);
    }

    #[test]
    fn test_rejected_operation_does_not_write() {
        let storage = MemoryStorage::new();
        let service = service_with(&storage);
        service.create_account(new_account("Alice", 10.0)).unwrap();
        let raw_before = storage.raw(DEFAULT_STORAGE_KEY);

        let result = service.withdraw("ACC001", 20.0);
        assert!(matches!(result, Err(StoreError::InsufficientFunds { .. })));
        assert_eq!(storage.raw(DEFAULT_STORAGE_KEY), raw_before);
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let service = service_with(&MemoryStorage::new());
        let result = service.evaluate(1.0, 2.0, "%");
        assert_eq!(result, Err(StoreError::UnknownOperator("%".to_string())));
        assert!(service.snapshot().calculator_data.history.is_empty());
    }

    #[test]
    fn test_history_limit_option_applies() {
        let options = StoreOptions {
            history_limit: 2,
            ..StoreOptions::default()
        };
        let service = StoreService::open(Arc::new(MemoryStorage::new()), options);
        for n in 0..5 {
            service.evaluate(f64::from(n), 1.0, "*").unwrap();
        }

        let history = service.snapshot().calculator_data.history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].expression, "4 * 1");
    }

    #[test]
    fn test_export_file_name_and_contents() {
        let service = service_with(&MemoryStorage::new());
        service.create_account(new_account("Alice", 12.0)).unwrap();

        let file = service.export_file("futuristic-projects").unwrap();
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(file.filename, format!("futuristic-projects-backup-{}.json", today));
        assert!(file.contents.contains('\n'));

        let document: ExportDocument = serde_json::from_str(&file.contents).unwrap();
        assert_eq!(document.bank_system_data.accounts[0].id, "ACC001");
    }

    #[test]
    fn test_import_through_service_persists() {
        let source = service_with(&MemoryStorage::new());
        source.create_account(new_account("Alice", 12.0)).unwrap();
        let file = source.export_file("app").unwrap();

        let storage = MemoryStorage::new();
        let target = service_with(&storage);
        let sections = target.import_json(&file.contents).unwrap();
        assert_eq!(sections.len(), 3);

        let reopened = service_with(&storage);
        assert_eq!(reopened.snapshot().bank_system_data.accounts.len(), 1);
    }

    #[test]
    fn test_file_backed_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let open = || {
            let connection = JsonConnection::new(temp_dir.path()).unwrap();
            StoreService::open(
                Arc::new(JsonSnapshotRepository::new(connection)),
                StoreOptions::default(),
            )
        };

        let service = open();
        service.create_account(new_account("Alice", 40.0)).unwrap();
        service.withdraw("ACC001", 15.0).unwrap();
        assert!(temp_dir
            .path()
            .join(format!("{}.json", DEFAULT_STORAGE_KEY))
            .exists());

        let reopened = open();
        let account = reopened.read(|store| store.find_account("ACC001").cloned()).unwrap();
        assert_eq!(account.balance, 25.0);
        assert_eq!(account.transactions.len(), 2);
    }

    #[test]
    fn test_rejected_overflow_keeps_state_across_restart() {
        let storage = MemoryStorage::new();
        let service = service_with(&storage);
        service.create_account(new_account("Alice", 1.7e308)).unwrap();

        assert!(service.evaluate(1e308, 10.0, "*").is_err());
        assert!(service.deposit("ACC001", 1.7e308).is_err());

        let reopened = service_with(&storage);
        let state = reopened.snapshot();
        assert_eq!(state.bank_system_data.accounts.len(), 1);
        assert_eq!(state.bank_system_data.accounts[0].balance, 1.7e308);
        assert!(state.calculator_data.history.is_empty());
    }
}
