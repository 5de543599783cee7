//! Backup documents: rendering exports and validating imports.
//!
//! Imports are checked section by section before anything is adopted. A
//! section that is present but malformed rejects the whole document.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use shared::{
    account_sequence, BankSystemData, CalculatorData, ExportDocument, GradeSystemData,
    SUBJECT_COUNT,
};

use super::error::StoreError;
use super::grading::validate_marks;

const BALANCE_TOLERANCE: f64 = 1e-6;

/// Sections of a backup document that passed validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPayload {
    pub calculator_data: Option<CalculatorData>,
    pub grade_system_data: Option<GradeSystemData>,
    pub bank_system_data: Option<BankSystemData>,
}

impl ImportPayload {
    pub fn is_empty(&self) -> bool {
        self.calculator_data.is_none()
            && self.grade_system_data.is_none()
            && self.bank_system_data.is_none()
    }

    /// Names of the sections present, in document order
    pub fn section_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.calculator_data.is_some() {
            names.push("calculatorData");
        }
        if self.grade_system_data.is_some() {
            names.push("gradeSystemData");
        }
        if self.bank_system_data.is_some() {
            names.push("bankSystemData");
        }
        names
    }
}

/// Suggested download name, e.g. "futuristic-projects-backup-2024-05-01.json"
pub fn export_filename(app_name: &str, date: NaiveDate) -> String {
    format!("{}-backup-{}.json", app_name, date.format("%Y-%m-%d"))
}

/// Pretty-printed JSON for the backup file
pub fn render_export(document: &ExportDocument) -> serde_json::Result<String> {
    serde_json::to_string_pretty(document)
}

/// Parse and validate a backup document
pub fn parse_import(raw: &str, history_limit: usize) -> Result<ImportPayload, StoreError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| StoreError::InvalidImportFormat(format!("not valid JSON: {}", e)))?;

    let Value::Object(mut object) = value else {
        return Err(StoreError::InvalidImportFormat(
            "expected a JSON object at the top level".to_string(),
        ));
    };

    let payload = ImportPayload {
        calculator_data: take_section(&mut object, "calculatorData")?,
        grade_system_data: take_section(&mut object, "gradeSystemData")?,
        bank_system_data: take_section(&mut object, "bankSystemData")?,
    };

    if payload.is_empty() {
        return Err(StoreError::InvalidImportFormat(
            "document contains none of calculatorData, gradeSystemData, bankSystemData".to_string(),
        ));
    }

    if let Some(calculator) = &payload.calculator_data {
        validate_calculator(calculator, history_limit)?;
    }
    if let Some(grades) = &payload.grade_system_data {
        validate_grades(grades)?;
    }
    if let Some(bank) = &payload.bank_system_data {
        validate_bank(bank)?;
    }

    Ok(payload)
}

fn take_section<T: DeserializeOwned>(
    object: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match object.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::InvalidImportFormat(format!("{}: {}", key, e))),
    }
}

fn invalid(message: String) -> StoreError {
    StoreError::InvalidImportFormat(message)
}

fn validate_calculator(data: &CalculatorData, history_limit: usize) -> Result<(), StoreError> {
    if data.history.len() > history_limit {
        return Err(invalid(format!(
            "calculatorData: history has {} entries, at most {} allowed",
            data.history.len(),
            history_limit
        )));
    }
    if !data.memory.is_finite() {
        return Err(invalid("calculatorData: memory must be a finite number".to_string()));
    }
    Ok(())
}

fn validate_grades(data: &GradeSystemData) -> Result<(), StoreError> {
    if data.subjects.len() != SUBJECT_COUNT {
        return Err(invalid(format!(
            "gradeSystemData: expected {} subjects, found {}",
            SUBJECT_COUNT,
            data.subjects.len()
        )));
    }

    let mut seen = HashSet::new();
    for student in &data.students {
        if !seen.insert(student.id) {
            return Err(invalid(format!("gradeSystemData: duplicate student id {}", student.id)));
        }
        validate_marks(&student.marks)
            .map_err(|e| invalid(format!("gradeSystemData: student {}: {}", student.id, e)))?;
    }
    Ok(())
}

fn validate_bank(data: &BankSystemData) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    let mut highest_sequence = 0;

    for account in &data.accounts {
        if !seen.insert(account.id.as_str()) {
            return Err(invalid(format!("bankSystemData: duplicate account id {}", account.id)));
        }
        if !account.balance.is_finite() || account.balance < 0.0 {
            return Err(invalid(format!(
                "bankSystemData: account {} has an invalid balance",
                account.id
            )));
        }

        let Some(last) = account.transactions.last() else {
            return Err(invalid(format!(
                "bankSystemData: account {} has no transactions",
                account.id
            )));
        };
        if (last.balance - account.balance).abs() > BALANCE_TOLERANCE {
            return Err(invalid(format!(
                "bankSystemData: account {} balance {:.2} does not match its last transaction ({:.2})",
                account.id, account.balance, last.balance
            )));
        }

        if let Some(sequence) = account_sequence(&account.id) {
            highest_sequence = highest_sequence.max(sequence);
        }
    }

    if data.account_counter <= highest_sequence {
        return Err(invalid(format!(
            "bankSystemData: accountCounter {} would reuse existing account numbers (highest is {})",
            data.account_counter, highest_sequence
        )));
    }
    Ok(())
}
