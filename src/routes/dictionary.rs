use axum::{response::IntoResponse, Json};
use serde_json::json;

use crate::services::report_service::status_dictionary;

/// Statuses with badge, terminal flag and reachable targets.
#[axum::debug_handler]
pub async fn list_application_statuses() -> impl IntoResponse {
    Json(json!({ "items": status_dictionary() }))
}
