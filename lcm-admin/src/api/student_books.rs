//! Student book endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudentBookRequest {
    pub url: String,
}

/// PUT /api/student-books/:level
pub async fn save_student_book(
    State(state): State<AppState>,
    Path(level): Path<String>,
    Json(request): Json<StudentBookRequest>,
) -> ApiResult<Json<Value>> {
    state
        .status
        .track(
            format!("student-book:{}", level),
            state.repository.save_student_book(&level, &request.url),
        )
        .await?;

    Ok(Json(json!({ "success": true })))
}
