//! # REST API for backup, restore and reset
//!
//! Export is served as a downloadable JSON file. Import accepts the raw file
//! body so that malformed JSON is reported by the validator, not the extractor.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info};

use shared::{ImportResponse, ResetResponse};

use super::error_response;
use crate::AppState;

/// Routes nested under `/api/data`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export", get(export_data))
        .route("/import", post(import_data))
        .route("/reset", post(reset_data))
}

pub async fn export_data(State(state): State<AppState>) -> Response {
    info!("GET /api/data/export");

    match state.store_service.export_file(&state.config.app_name) {
        Ok(file) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/json".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file.filename),
                ),
            ],
            file.contents,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to export data: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error exporting data").into_response()
        }
    }
}

pub async fn import_data(State(state): State<AppState>, body: String) -> Response {
    info!("POST /api/data/import - {} bytes", body.len());

    match state.store_service.import_json(&body) {
        Ok(sections) => {
            let success_message = format!("Imported {}", sections.join(", "));
            let response = ImportResponse {
                imported_sections: sections.into_iter().map(String::from).collect(),
                success_message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Failed to import data", e),
    }
}

/// Clear project data; profile and settings are kept
pub async fn reset_data(State(state): State<AppState>) -> Response {
    info!("POST /api/data/reset");

    match state.store_service.reset_all_data() {
        Ok(()) => {
            let response = ResetResponse {
                success_message: "All project data has been reset".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Failed to reset data", e),
    }
}
