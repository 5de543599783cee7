//! # REST API for the calculator mini project

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tracing::info;

use shared::{CalculationEntry, EvaluateRequest, EvaluateResponse, MemoryRequest};

use super::error_response;
use crate::AppState;

/// Routes nested under `/api/calculator`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_calculator))
        .route("/evaluate", post(evaluate))
        .route("/history", post(add_history).delete(clear_history))
        .route("/memory", put(update_memory))
}

pub async fn get_calculator(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/calculator");
    let data = state.store_service.read(|store| store.calculator_data().clone());
    (StatusCode::OK, Json(data))
}

pub async fn evaluate(State(state): State<AppState>, Json(request): Json<EvaluateRequest>) -> Response {
    info!("POST /api/calculator/evaluate - request: {:?}", request);

    match state
        .store_service
        .evaluate(request.first, request.second, &request.operator)
    {
        Ok(entry) => {
            let response = EvaluateResponse {
                result: entry.result,
                entry,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Failed to evaluate expression", e),
    }
}

/// Record an expression evaluated elsewhere
pub async fn add_history(State(state): State<AppState>, Json(entry): Json<CalculationEntry>) -> Response {
    info!("POST /api/calculator/history - {}", entry.expression);

    match state.store_service.add_calculator_history(entry) {
        Ok(()) => {
            let data = state.store_service.read(|store| store.calculator_data().clone());
            (StatusCode::CREATED, Json(data)).into_response()
        }
        Err(e) => error_response("Failed to add history entry", e),
    }
}

pub async fn clear_history(State(state): State<AppState>) -> Response {
    info!("DELETE /api/calculator/history");

    match state.store_service.clear_calculator_history() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to clear history", e),
    }
}

pub async fn update_memory(State(state): State<AppState>, Json(request): Json<MemoryRequest>) -> Response {
    info!("PUT /api/calculator/memory - value: {}", request.value);

    match state.store_service.update_calculator_memory(request.value) {
        Ok(()) => {
            let data = state.store_service.read(|store| store.calculator_data().clone());
            (StatusCode::OK, Json(data)).into_response()
        }
        Err(e) => error_response("Failed to update memory", e),
    }
}
