//! Announcement generation endpoint

use axum::{extract::State, Json};
use lcm_common::generator::{compose_announcement, AnnouncementRequest};
use serde_json::{json, Value};
use tracing::debug;

use crate::{ApiResult, AppState};

/// POST /api/generate
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<AnnouncementRequest>,
) -> ApiResult<Json<Value>> {
    let catalog = state.repository.catalog().await?;
    let content = compose_announcement(&catalog, &request)?;
    debug!(chars = content.chars().count(), "Announcement composed");

    Ok(Json(json!({ "success": true, "content": content })))
}
