//! Subject endpoints

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
pub struct CreateSubjectRequest {
    pub subject_code: String,
    pub subject_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenameSubjectRequest {
    pub subject_name: String,
}

/// POST /api/subjects
pub async fn create_subject(
    State(state): State<AppState>,
    Json(request): Json<CreateSubjectRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let code = state
        .status
        .track(
            "create-subject".to_string(),
            state
                .repository
                .create_subject(&request.subject_code, &request.subject_name),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "subject_code": code })),
    ))
}

/// PUT /api/subjects/:code
pub async fn rename_subject(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<RenameSubjectRequest>,
) -> ApiResult<Json<Value>> {
    state
        .status
        .track(
            format!("rename-subject:{}", code),
            state.repository.rename_subject(&code, &request.subject_name),
        )
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/subjects/:code
///
/// Permanent: removes every level, lesson and student book of the subject.
pub async fn delete_subject(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<Value>> {
    state
        .status
        .track(
            format!("delete-subject:{}", code),
            state.repository.delete_subject(&code),
        )
        .await?;

    Ok(Json(json!({ "success": true })))
}
