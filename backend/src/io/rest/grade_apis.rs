//! # REST API for the student grade system
//!
//! Students are graded by the store; callers only send a name and five marks.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, warn};

use shared::{GradePreviewRequest, GradesResponse, NewStudent, StudentPatch, StudentResponse};

use super::{error_response, not_found};
use crate::domain::grading::{calculate_grade, grade_stats, validate_marks};
use crate::AppState;

/// Routes nested under `/api/grades`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_grades))
        .route("/preview", post(preview_grade))
        .route("/students", post(add_student))
        .route("/students/:id", put(update_student).delete(delete_student))
}

/// Students, subjects, grading scale and dashboard statistics
pub async fn get_grades(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/grades");

    let response = state.store_service.read(|store| {
        let data = store.grade_system_data();
        GradesResponse {
            students: data.students.clone(),
            subjects: data.subjects.clone(),
            grading_scale: data.grading_scale.clone(),
            stats: grade_stats(&data.students),
        }
    });
    (StatusCode::OK, Json(response))
}

/// Grade a set of marks without recording anything
pub async fn preview_grade(Json(request): Json<GradePreviewRequest>) -> Response {
    info!("POST /api/grades/preview - marks: {:?}", request.marks);

    if let Err(e) = validate_marks(&request.marks) {
        return error_response("Rejected grade preview", e);
    }
    (StatusCode::OK, Json(calculate_grade(&request.marks))).into_response()
}

pub async fn add_student(State(state): State<AppState>, Json(request): Json<NewStudent>) -> Response {
    info!("POST /api/grades/students - request: {:?}", request);

    match state.store_service.add_student(request) {
        Ok(student) => {
            let success_message = format!(
                "{} scored {} / 500 (grade {}, {})",
                student.name, student.total, student.grade, student.description
            );
            (StatusCode::CREATED, Json(StudentResponse { student, success_message })).into_response()
        }
        Err(e) => error_response("Failed to add student", e),
    }
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(patch): Json<StudentPatch>,
) -> Response {
    info!("PUT /api/grades/students/{} - request: {:?}", id, patch);

    match state.store_service.update_student(id, patch) {
        Ok(Some(student)) => {
            let success_message = format!("{} is now graded {}", student.name, student.grade);
            (StatusCode::OK, Json(StudentResponse { student, success_message })).into_response()
        }
        Ok(None) => not_found(format!("Student {} not found", id)),
        Err(e) => error_response("Failed to update student", e),
    }
}

pub async fn delete_student(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    info!("DELETE /api/grades/students/{}", id);

    match state.store_service.delete_student(id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => {
            warn!("Delete requested for unknown student {}", id);
            not_found(format!("Student {} not found", id))
        }
        Err(e) => error_response("Failed to delete student", e),
    }
}
