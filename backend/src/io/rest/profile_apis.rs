//! # REST API for the student profile and application settings

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::put,
    Json, Router,
};
use tracing::info;

use shared::{AppSettingsPatch, StudentInfoPatch};

use super::error_response;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/student-info", put(update_student_info))
        .route("/settings", put(update_app_settings))
}

pub async fn update_student_info(
    State(state): State<AppState>,
    Json(patch): Json<StudentInfoPatch>,
) -> Response {
    info!("PUT /api/student-info - request: {:?}", patch);

    match state.store_service.update_student_info(patch) {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(e) => error_response("Failed to update student info", e),
    }
}

pub async fn update_app_settings(
    State(state): State<AppState>,
    Json(patch): Json<AppSettingsPatch>,
) -> Response {
    info!("PUT /api/settings - request: {:?}", patch);

    match state.store_service.update_app_settings(patch) {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => error_response("Failed to update settings", e),
    }
}
