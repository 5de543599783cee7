//! Errors surfaced by store operations.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Insufficient funds in account {account_id}: balance {balance:.2}, requested {requested:.2}")]
    InsufficientFunds {
        account_id: String,
        balance: f64,
        requested: f64,
    },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid marks: {0}")]
    InvalidMarks(String),
    #[error("Invalid import format: {0}")]
    InvalidImportFormat(String),
    /// The id sequence for this kind of record has no values left
    #[error("No {0} ids left to assign")]
    IdsExhausted(&'static str),
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    /// Snapshot could not be written; in-memory state was left untouched
    #[error("Failed to persist snapshot: {0}")]
    Persistence(String),
}
