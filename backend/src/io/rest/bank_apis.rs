//! # REST API for the bank management system
//!
//! Amounts in success messages are formatted as US dollars.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::info;

use shared::{
    format_currency, Account, AccountResponse, BalanceChangeRequest, BankResponse, MoneyRequest,
    NewAccount,
};

use super::{error_response, not_found};
use crate::domain::{bank::account_stats, StoreError};
use crate::AppState;

/// Routes nested under `/api/bank`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_bank))
        .route("/accounts", post(create_account))
        .route("/accounts/:id", delete(delete_account))
        .route("/accounts/:id/deposit", post(deposit))
        .route("/accounts/:id/withdraw", post(withdraw))
        .route("/accounts/:id/transactions", post(record_transaction))
}

pub async fn get_bank(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/bank");

    let response = state.store_service.read(|store| {
        let data = store.bank_system_data();
        BankResponse {
            accounts: data.accounts.clone(),
            total_balance: data.total_balance,
            account_counter: data.account_counter,
            stats: account_stats(&data.accounts),
        }
    });
    (StatusCode::OK, Json(response))
}

pub async fn create_account(State(state): State<AppState>, Json(request): Json<NewAccount>) -> Response {
    info!("POST /api/bank/accounts - request: {:?}", request);

    match state.store_service.create_account(request) {
        Ok(account) => {
            let success_message = format!(
                "Account {} opened for {} with {}",
                account.id,
                account.name,
                format_currency(account.balance)
            );
            (StatusCode::CREATED, Json(AccountResponse { account, success_message })).into_response()
        }
        Err(e) => error_response("Failed to create account", e),
    }
}

pub async fn delete_account(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("DELETE /api/bank/accounts/{}", id);

    match state.store_service.delete_account(&id) {
        Ok(Some(account)) => {
            let success_message = format!("Account {} closed", account.id);
            (StatusCode::OK, Json(AccountResponse { account, success_message })).into_response()
        }
        Ok(None) => not_found(format!("Account {} not found", id)),
        Err(e) => error_response("Failed to delete account", e),
    }
}

pub async fn deposit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MoneyRequest>,
) -> Response {
    info!("POST /api/bank/accounts/{}/deposit - amount: {}", id, request.amount);

    let result = state.store_service.deposit(&id, request.amount);
    balance_response(&id, result, |account| {
        format!(
            "Deposited {} into {}. New balance: {}",
            format_currency(request.amount),
            account.id,
            format_currency(account.balance)
        )
    })
}

pub async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MoneyRequest>,
) -> Response {
    info!("POST /api/bank/accounts/{}/withdraw - amount: {}", id, request.amount);

    let result = state.store_service.withdraw(&id, request.amount);
    balance_response(&id, result, |account| {
        format!(
            "Withdrew {} from {}. New balance: {}",
            format_currency(request.amount),
            account.id,
            format_currency(account.balance)
        )
    })
}

/// Apply a raw signed balance change with a custom label
pub async fn record_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<BalanceChangeRequest>,
) -> Response {
    info!("POST /api/bank/accounts/{}/transactions - request: {:?}", id, request);

    let description = request.description.as_deref().unwrap_or("");
    let result = state.store_service.update_account_balance(
        &id,
        request.amount,
        &request.transaction_type,
        description,
    );
    balance_response(&id, result, |account| {
        format!(
            "Recorded {} on {}. New balance: {}",
            request.transaction_type,
            account.id,
            format_currency(account.balance)
        )
    })
}

fn balance_response(
    id: &str,
    result: Result<Option<Account>, StoreError>,
    message: impl FnOnce(&Account) -> String,
) -> Response {
    match result {
        Ok(Some(account)) => {
            let success_message = message(&account);
            (StatusCode::OK, Json(AccountResponse { account, success_message })).into_response()
        }
        Ok(None) => not_found(format!("Account {} not found", id)),
        Err(e) => error_response(&format!("Balance change on {} failed", id), e),
    }
}
