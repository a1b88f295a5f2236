//! Sheet-based save endpoints kept for older clients
//!
//! A sheet is `SUBJECT/LEVEL`, or a bare level code when only one subject
//! has that level. Saves go to the document store like the regular
//! endpoints.

use axum::{extract::State, Json};
use lcm_common::form::LessonForm;
use lcm_common::repository::resolve_sheet;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveDataRequest {
    pub sheet: String,
    /// Lesson key, e.g. `lesson_3`
    pub lesson: String,
    pub data: Option<LessonForm>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveStudentBookRequest {
    pub sheet: String,
    pub student_book: Option<String>,
}

/// POST /api/save-data
pub async fn save_data(
    State(state): State<AppState>,
    Json(request): Json<SaveDataRequest>,
) -> ApiResult<Json<Value>> {
    let (Some(form), false, false) = (
        request.data.as_ref(),
        request.sheet.trim().is_empty(),
        request.lesson.trim().is_empty(),
    ) else {
        return Err(ApiError::BadRequest(
            "'sheet', 'lesson' and 'data' are required".to_string(),
        ));
    };

    let catalog = state.repository.catalog().await?;
    let (subject, level) = resolve_sheet(&catalog, &request.sheet)?;

    state
        .status
        .track(
            format!("save-lesson:{}/{}/{}", subject, level, request.lesson),
            state
                .repository
                .save_lesson(&subject, &level, &request.lesson, form),
        )
        .await?;

    Ok(Json(json!({ "success": true, "message": "Saved" })))
}

/// POST /api/save-student-book
pub async fn save_student_book_by_sheet(
    State(state): State<AppState>,
    Json(request): Json<SaveStudentBookRequest>,
) -> ApiResult<Json<Value>> {
    let sheet = request.sheet.trim();
    if sheet.is_empty() {
        return Err(ApiError::BadRequest("'sheet' is required".to_string()));
    }

    // Student books are keyed by level code alone
    let level = sheet.rsplit('/').next().unwrap_or(sheet).trim().to_string();
    let url = request.student_book.clone().unwrap_or_default();

    state
        .status
        .track(
            format!("student-book:{}", level),
            state.repository.save_student_book(&level, &url),
        )
        .await?;

    Ok(Json(json!({ "success": true, "message": "Saved" })))
}
