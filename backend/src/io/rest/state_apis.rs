//! Read surface for the whole state tree.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use tracing::info;

use shared::StateResponse;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/state", get(get_state))
}

/// Full state tree plus whether the profile is filled in
pub async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/state");

    let snapshot = state.store_service.snapshot();
    let profile_complete = snapshot.student_info.is_complete();
    let response = StateResponse {
        state: snapshot,
        profile_complete,
    };
    (StatusCode::OK, Json(response))
}
