//! Action status endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::status::StatusEntry;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    /// Targets that are saving, or showed success/error within their reset delay
    pub statuses: Vec<StatusEntry>,
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        success: true,
        statuses: state.status.snapshot(),
    })
}
