//! # Config Store
//!
//! In-memory container for all application state: the student profile,
//! application settings, and the data of the three mini projects
//! (calculator, grade system, bank system).
//!
//! The store is persistence-agnostic. Every mutation is a plain method that
//! brings the state from one consistent value to the next; `StoreService`
//! takes care of writing snapshots around it.
//!
//! ## Invariants
//!
//! - Calculator history holds at most `history_limit` entries, oldest evicted first
//! - Student `total`/`average`/`grade`/`description` are always derived from `marks`
//! - Student ids are strictly increasing and never reused
//! - Account ids are `ACC` + zero-padded counter; the counter only grows
//! - An account's balance equals the balance of its last transaction
//! - `totalBalance` equals the sum of all account balances

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use shared::{
    generate_account_number, Account, AccountTransaction, AppSettings, AppSettingsPatch,
    BankSystemData, CalculationEntry, CalculatorData, ExportDocument, GradeSystemData, NewAccount,
    NewStudent, PersistedState, Student, StudentInfo, StudentInfoPatch, StudentPatch,
};

use super::bank::{self, DEPOSIT, INITIAL_DEPOSIT, OPENING_DESCRIPTION, WITHDRAWAL};
use super::calculator::{format_expression, Operator};
use super::error::StoreError;
use super::grading::{apply_grade, validate_marks};
use super::import_export::{parse_import, ImportPayload};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Current time as an ISO-8601 string, e.g. "2024-05-01T12:00:00.000Z"
pub fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigStore {
    state: PersistedState,
    history_limit: usize,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(PersistedState::default())
    }
}

impl ConfigStore {
    pub fn new(state: PersistedState) -> Self {
        Self {
            state,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Change the history bound; existing history is trimmed to fit
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self.enforce_history_bound();
        self
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Full state tree for read-only consumers
    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn student_info(&self) -> &StudentInfo {
        &self.state.student_info
    }

    pub fn app_settings(&self) -> &AppSettings {
        &self.state.app_settings
    }

    pub fn calculator_data(&self) -> &CalculatorData {
        &self.state.calculator_data
    }

    pub fn grade_system_data(&self) -> &GradeSystemData {
        &self.state.grade_system_data
    }

    pub fn bank_system_data(&self) -> &BankSystemData {
        &self.state.bank_system_data
    }

    pub fn find_student(&self, id: u64) -> Option<&Student> {
        self.state.grade_system_data.students.iter().find(|s| s.id == id)
    }

    pub fn find_account(&self, id: &str) -> Option<&Account> {
        self.state.bank_system_data.accounts.iter().find(|a| a.id == id)
    }

    // ---------------------------------------------------------------------
    // Profile and settings
    // ---------------------------------------------------------------------

    /// Shallow-merge the provided fields into the student profile
    pub fn update_student_info(&mut self, patch: StudentInfoPatch) -> &StudentInfo {
        let info = &mut self.state.student_info;
        if let Some(name) = patch.name {
            info.name = name;
        }
        if let Some(roll_number) = patch.roll_number {
            info.roll_number = roll_number;
        }
        if let Some(college) = patch.college {
            info.college = college;
        }
        if let Some(subject) = patch.subject {
            info.subject = subject;
        }
        if let Some(email) = patch.email {
            info.email = email;
        }
        if let Some(avatar) = patch.avatar {
            info.avatar = Some(avatar);
        }
        if let Some(theme) = patch.theme {
            info.theme = theme;
        }

        info!("Updated student info for '{}'", self.state.student_info.name);
        &self.state.student_info
    }

    /// Shallow-merge the provided fields into the application settings
    pub fn update_app_settings(&mut self, patch: AppSettingsPatch) -> &AppSettings {
        let settings = &mut self.state.app_settings;
        if let Some(theme) = patch.theme {
            settings.theme = theme;
        }
        if let Some(animations) = patch.animations {
            settings.animations = animations;
        }
        if let Some(sound_effects) = patch.sound_effects {
            settings.sound_effects = sound_effects;
        }
        if let Some(language) = patch.language {
            settings.language = language;
        }
        if let Some(notifications) = patch.notifications {
            settings.notifications = notifications;
        }
        if let Some(auto_save) = patch.auto_save {
            settings.auto_save = auto_save;
        }

        info!("Updated app settings");
        &self.state.app_settings
    }

    // ---------------------------------------------------------------------
    // Calculator
    // ---------------------------------------------------------------------

    /// Append an entry, evicting the oldest ones beyond the history bound
    pub fn add_calculator_history(&mut self, entry: CalculationEntry) {
        let calculator = &mut self.state.calculator_data;
        calculator.last_result = Some(entry.result);
        calculator.history.push(entry);
        self.enforce_history_bound();
    }

    /// Evaluate `first <op> second` and record it in the history.
    /// Results that overflow to infinity are rejected and nothing is recorded.
    pub fn evaluate(&mut self, first: f64, second: f64, operator: Operator) -> Result<CalculationEntry, StoreError> {
        let expression = format_expression(first, operator, second);
        let result = operator.apply(first, second);
        require_finite(&format!("result of {}", expression), result)?;

        let entry = CalculationEntry {
            expression,
            result,
            timestamp: iso_now(),
        };
        info!("Evaluated {} = {}", entry.expression, entry.result);

        self.add_calculator_history(entry.clone());
        Ok(entry)
    }

    pub fn update_calculator_memory(&mut self, value: f64) {
        self.state.calculator_data.memory = value;
        info!("Updated calculator memory to {}", value);
    }

    pub fn clear_calculator_history(&mut self) {
        self.state.calculator_data.history.clear();
        info!("Cleared calculator history");
    }

    fn enforce_history_bound(&mut self) {
        let limit = self.history_limit;
        let history = &mut self.state.calculator_data.history;
        if history.len() > limit {
            let excess = history.len() - limit;
            history.drain(..excess);
        }
    }

    // ---------------------------------------------------------------------
    // Grade system
    // ---------------------------------------------------------------------

    /// Grade and record a new student
    pub fn add_student(&mut self, request: NewStudent) -> Result<Student, StoreError> {
        validate_marks(&request.marks)?;

        let id = self.next_student_id()?;
        let mut student = Student {
            id,
            name: request.name,
            marks: request.marks,
            total: 0,
            average: 0.0,
            grade: shared::Grade::F,
            description: String::new(),
            created_at: iso_now(),
            evaluated_by: self.state.student_info.name.clone(),
        };
        apply_grade(&mut student);

        info!(
            "Added student {} '{}' with average {} (grade {})",
            student.id, student.name, student.average, student.grade
        );
        self.state.grade_system_data.students.push(student.clone());
        Ok(student)
    }

    /// Merge name and/or marks into a student and regrade it.
    /// Returns `Ok(None)` when no student has this id.
    pub fn update_student(&mut self, id: u64, patch: StudentPatch) -> Result<Option<Student>, StoreError> {
        if let Some(marks) = &patch.marks {
            validate_marks(marks)?;
        }

        let Some(student) = self
            .state
            .grade_system_data
            .students
            .iter_mut()
            .find(|s| s.id == id)
        else {
            warn!("Student not found for update: {}", id);
            return Ok(None);
        };

        if let Some(name) = patch.name {
            student.name = name;
        }
        if let Some(marks) = patch.marks {
            student.marks = marks;
        }
        apply_grade(student);

        info!("Updated student {} (grade {})", student.id, student.grade);
        Ok(Some(student.clone()))
    }

    /// Returns whether a student was removed
    pub fn delete_student(&mut self, id: u64) -> bool {
        let students = &mut self.state.grade_system_data.students;
        let before = students.len();
        students.retain(|s| s.id != id);

        let removed = students.len() < before;
        if removed {
            info!("Deleted student {}", id);
        } else {
            warn!("Student not found for deletion: {}", id);
        }
        removed
    }

    /// Millisecond timestamp, bumped past every id handed out so far
    fn next_student_id(&mut self) -> Result<u64, StoreError> {
        let data = &mut self.state.grade_system_data;
        let highest_existing = data.students.iter().map(|s| s.id).max().unwrap_or(0);
        let now_millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);

        let after_last = data
            .last_student_id
            .max(highest_existing)
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted("student"))?;

        let id = now_millis.max(after_last);
        data.last_student_id = id;
        Ok(id)
    }

    // ---------------------------------------------------------------------
    // Bank system
    // ---------------------------------------------------------------------

    /// Open an account seeded with an "Initial Deposit" transaction
    pub fn create_account(&mut self, request: NewAccount) -> Result<Account, StoreError> {
        if !request.balance.is_finite() || request.balance < 0.0 {
            return Err(StoreError::InvalidAmount(format!(
                "opening deposit must be a non-negative number, got {}",
                request.balance
            )));
        }

        let created_by = self.state.student_info.name.clone();
        let now = iso_now();
        let bank = &mut self.state.bank_system_data;

        let next_counter = bank
            .account_counter
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted("account"))?;
        require_finite("total balance", bank::total_balance(&bank.accounts) + request.balance)?;

        let account = Account {
            id: generate_account_number(bank.account_counter),
            name: request.name,
            age: request.age,
            phone: request.phone,
            balance: request.balance,
            transactions: vec![AccountTransaction {
                transaction_type: INITIAL_DEPOSIT.to_string(),
                amount: request.balance,
                balance: request.balance,
                date: now.clone(),
                description: OPENING_DESCRIPTION.to_string(),
            }],
            created_at: now,
            created_by,
        };

        bank.account_counter = next_counter;
        bank.accounts.push(account.clone());
        bank.total_balance = bank::total_balance(&bank.accounts);

        info!("Created account {} for '{}' with ${:.2}", account.id, account.name, account.balance);
        Ok(account)
    }

    /// Apply a signed balance change and append it to the ledger.
    ///
    /// Returns `Ok(None)` when no account has this id. A change that would
    /// drive the balance below zero is rejected with `InsufficientFunds`.
    pub fn update_account_balance(
        &mut self,
        account_id: &str,
        signed_amount: f64,
        transaction_type: &str,
        description: &str,
    ) -> Result<Option<Account>, StoreError> {
        if !signed_amount.is_finite() {
            return Err(StoreError::InvalidAmount(format!("{} is not a finite amount", signed_amount)));
        }

        let bank = &mut self.state.bank_system_data;
        let Some(index) = bank.accounts.iter().position(|a| a.id == account_id) else {
            warn!("Account not found for balance update: {}", account_id);
            return Ok(None);
        };

        let new_balance = bank.accounts[index].balance + signed_amount;
        require_finite(&format!("balance of {}", account_id), new_balance)?;
        let projected_total: f64 = bank
            .accounts
            .iter()
            .enumerate()
            .map(|(i, a)| if i == index { new_balance } else { a.balance })
            .sum();
        require_finite("total balance", projected_total)?;

        let account = &mut bank.accounts[index];
        if new_balance < 0.0 {
            warn!(
                "Rejected {} of ${:.2} on {}: balance is ${:.2}",
                transaction_type,
                signed_amount.abs(),
                account_id,
                account.balance
            );
            return Err(StoreError::InsufficientFunds {
                account_id: account_id.to_string(),
                balance: account.balance,
                requested: signed_amount.abs(),
            });
        }

        let description = if description.trim().is_empty() {
            transaction_type
        } else {
            description
        };
        account.transactions.push(AccountTransaction {
            transaction_type: transaction_type.to_string(),
            amount: signed_amount.abs(),
            balance: new_balance,
            date: iso_now(),
            description: description.to_string(),
        });
        account.balance = new_balance;
        let updated = account.clone();

        bank.total_balance = bank::total_balance(&bank.accounts);

        info!(
            "{} of ${:.2} on {}: new balance ${:.2}",
            transaction_type,
            signed_amount.abs(),
            account_id,
            new_balance
        );
        Ok(Some(updated))
    }

    pub fn deposit(&mut self, account_id: &str, amount: f64) -> Result<Option<Account>, StoreError> {
        Self::require_positive(amount)?;
        self.update_account_balance(account_id, amount, DEPOSIT, "Deposit via web interface")
    }

    pub fn withdraw(&mut self, account_id: &str, amount: f64) -> Result<Option<Account>, StoreError> {
        Self::require_positive(amount)?;
        self.update_account_balance(account_id, -amount, WITHDRAWAL, "Withdrawal via web interface")
    }

    fn require_positive(amount: f64) -> Result<(), StoreError> {
        if amount.is_finite() && amount > 0.0 {
            Ok(())
        } else {
            Err(StoreError::InvalidAmount(format!("amount must be greater than 0, got {}", amount)))
        }
    }

    /// Remove an account, returning it if it existed
    pub fn delete_account(&mut self, account_id: &str) -> Option<Account> {
        let bank = &mut self.state.bank_system_data;
        let Some(position) = bank.accounts.iter().position(|a| a.id == account_id) else {
            warn!("Account not found for deletion: {}", account_id);
            return None;
        };

        let removed = bank.accounts.remove(position);
        bank.total_balance = bank::total_balance(&bank.accounts);

        info!("Deleted account {} (balance ${:.2})", removed.id, removed.balance);
        Some(removed)
    }

    // ---------------------------------------------------------------------
    // Whole-state operations
    // ---------------------------------------------------------------------

    /// Clear calculator, grade and bank data. Profile, settings, subjects,
    /// grading scale and the student id watermark survive.
    pub fn reset_all_data(&mut self) {
        self.state.calculator_data = CalculatorData::default();
        self.state.grade_system_data.students.clear();
        self.state.bank_system_data = BankSystemData::default();
        info!("Reset all mini project data");
    }

    pub fn export_data(&self) -> ExportDocument {
        ExportDocument {
            student_info: self.state.student_info.clone(),
            calculator_data: self.state.calculator_data.clone(),
            grade_system_data: self.state.grade_system_data.clone(),
            bank_system_data: self.state.bank_system_data.clone(),
            exported_at: iso_now(),
        }
    }

    /// Adopt the sections present in a validated payload, recomputing their
    /// derived fields. Returns the names of the adopted sections.
    pub fn import_data(&mut self, payload: ImportPayload) -> Vec<&'static str> {
        let sections = payload.section_names();

        if let Some(calculator) = payload.calculator_data {
            self.state.calculator_data = calculator;
            self.enforce_history_bound();
        }

        if let Some(mut grades) = payload.grade_system_data {
            for student in &mut grades.students {
                apply_grade(student);
            }
            let highest = grades.students.iter().map(|s| s.id).max().unwrap_or(0);
            grades.last_student_id = grades.last_student_id.max(highest);
            self.state.grade_system_data = grades;
        }

        if let Some(mut bank) = payload.bank_system_data {
            bank.total_balance = bank::total_balance(&bank.accounts);
            self.state.bank_system_data = bank;
        }

        info!("Imported sections: {}", sections.join(", "));
        sections
    }

    /// Validate a backup document and adopt it
    pub fn import_json(&mut self, raw: &str) -> Result<Vec<&'static str>, StoreError> {
        let payload = parse_import(raw, self.history_limit)?;
        Ok(self.import_data(payload))
    }
}

/// Reject values that would not survive a JSON snapshot
fn require_finite(what: &str, value: f64) -> Result<(), StoreError> {
    if value.is_finite() {
        Ok(())
    } else {
        warn!("Rejected non-finite {}", what);
        Err(StoreError::InvalidAmount(format!("{} is out of range", what)))
    }
}
