//! Lesson endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use lcm_common::form::LessonForm;
use lcm_common::models::lesson_key;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateLessonRequest {
    /// Explicit number; the next free one when absent
    pub lesson_number: Option<u32>,
}

/// POST /api/subjects/:code/levels/:level/lessons
pub async fn create_lesson(
    State(state): State<AppState>,
    Path((subject, level)): Path<(String, String)>,
    Json(request): Json<CreateLessonRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let number = state
        .status
        .track(
            format!("create-lesson:{}/{}", subject, level),
            state
                .repository
                .create_lesson(&subject, &level, request.lesson_number),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "lesson_number": number,
            "lesson_key": lesson_key(number),
        })),
    ))
}

/// PUT /api/subjects/:code/levels/:level/lessons/:number
///
/// Saves the form. Homework result and deadline already stored are kept.
pub async fn save_lesson(
    State(state): State<AppState>,
    Path((subject, level, number)): Path<(String, String, u32)>,
    Json(form): Json<LessonForm>,
) -> ApiResult<Json<Value>> {
    let key = lesson_key(number);
    let lesson = state
        .status
        .track(
            format!("save-lesson:{}/{}/{}", subject, level, key),
            state.repository.save_lesson(&subject, &level, &key, &form),
        )
        .await?;

    Ok(Json(json!({ "success": true, "lesson": lesson })))
}

/// DELETE /api/subjects/:code/levels/:level/lessons/:number
pub async fn delete_lesson(
    State(state): State<AppState>,
    Path((subject, level, number)): Path<(String, String, u32)>,
) -> ApiResult<Json<Value>> {
    state
        .status
        .track(
            format!("delete-lesson:{}/{}/{}", subject, level, lesson_key(number)),
            state.repository.delete_lesson(&subject, &level, number),
        )
        .await?;

    Ok(Json(json!({ "success": true })))
}
