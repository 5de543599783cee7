//! # REST API Interface Layer
//!
//! HTTP endpoints over the store service. Handlers deserialize the request,
//! call one service operation, and translate the outcome into a status code:
//!
//! | Outcome | Status |
//! |---|---|
//! | `InsufficientFunds`, `IdsExhausted` | 409 |
//! | `InvalidAmount`, `InvalidMarks`, `UnknownOperator` | 400 |
//! | `InvalidImportFormat` | 422 |
//! | `Persistence` | 500 |
//! | unknown student or account id | 404 |

pub mod bank_apis;
pub mod calculator_apis;
pub mod data_apis;
pub mod grade_apis;
pub mod logging_apis;
pub mod profile_apis;
pub mod state_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::domain::StoreError;

pub fn status_for(err: &StoreError) -> StatusCode {
    match err {
        StoreError::InsufficientFunds { .. } | StoreError::IdsExhausted(_) => StatusCode::CONFLICT,
        StoreError::InvalidAmount(_) | StoreError::InvalidMarks(_) | StoreError::UnknownOperator(_) => {
            StatusCode::BAD_REQUEST
        }
        StoreError::InvalidImportFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StoreError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log a failed operation and turn it into a plain-text error response
pub fn error_response(context: &str, err: StoreError) -> Response {
    error!("{}: {}", context, err);
    (status_for(&err), err.to_string()).into_response()
}

pub fn not_found(message: String) -> Response {
    (StatusCode::NOT_FOUND, message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let insufficient = StoreError::InsufficientFunds {
            account_id: "ACC001".to_string(),
            balance: 1.0,
            requested: 2.0,
        };
        assert_eq!(status_for(&insufficient), StatusCode::CONFLICT);
        assert_eq!(status_for(&StoreError::IdsExhausted("account")), StatusCode::CONFLICT);
        assert_eq!(status_for(&StoreError::InvalidMarks("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&StoreError::UnknownOperator("%".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&StoreError::InvalidImportFormat("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&StoreError::Persistence("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
