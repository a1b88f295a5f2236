//! Level endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateLevelRequest {
    pub level_code: String,
}

/// POST /api/subjects/:code/levels
pub async fn create_level(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Json(request): Json<CreateLevelRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let level_code = state
        .status
        .track(
            format!("create-level:{}", subject),
            state.repository.create_level(&subject, &request.level_code),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "level_code": level_code })),
    ))
}

/// DELETE /api/subjects/:code/levels/:level
pub async fn delete_level(
    State(state): State<AppState>,
    Path((subject, level)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    state
        .status
        .track(
            format!("delete-level:{}/{}", subject, level),
            state.repository.delete_level(&subject, &level),
        )
        .await?;

    Ok(Json(json!({ "success": true })))
}
