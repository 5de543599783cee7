//! Forwarding of UI log lines into the server log.

use axum::{routing::post, Json, Router};
use serde::Serialize;
use tracing::{debug, error, info, warn, Level};

use shared::LogEntry;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub success: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/logs", post(log_message))
}

/// Unknown levels are logged at info
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" | "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

pub async fn log_message(Json(entry): Json<LogEntry>) -> Json<LogResponse> {
    let component = entry.component.as_deref().unwrap_or("frontend");

    let level = parse_level(&entry.level);
    if level == Level::DEBUG {
        debug!(component, "{}", entry.message);
    } else if level == Level::WARN {
        warn!(component, "{}", entry.message);
    } else if level == Level::ERROR {
        error!(component, "{}", entry.message);
    } else {
        info!(component, "{}", entry.message);
    }

    Json(LogResponse { success: true })
}
