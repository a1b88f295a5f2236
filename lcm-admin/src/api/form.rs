//! Form state endpoint
//!
//! Resolves a requested selection the way the editor does: an unknown
//! subject clears everything, a level defaults to its first lesson, and a
//! lesson number only sticks if that lesson exists.

use axum::{
    extract::{Query, State},
    Json,
};
use lcm_common::form::{LessonForm, Selection};
use serde::{Deserialize, Serialize};

use crate::{ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    pub subject: Option<String>,
    pub level: Option<String>,
    pub lesson: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub success: bool,
    pub selection: Selection,
    pub form: LessonForm,
    /// Student book of the selected level ("" when none)
    pub student_book: String,
    /// Levels of the selected subject in display order
    pub level_codes: Vec<String>,
    /// Lessons of the selected level in ascending order
    pub lesson_numbers: Vec<u32>,
}

/// GET /api/form?subject=&level=&lesson=
pub async fn get_form(
    State(state): State<AppState>,
    Query(query): Query<FormQuery>,
) -> ApiResult<Json<FormResponse>> {
    let catalog = state.repository.catalog().await?;
    let selection = Selection::resolve(
        &catalog,
        query.subject.as_deref(),
        query.level.as_deref(),
        query.lesson,
    );

    let form = LessonForm::for_selection(&catalog, &selection);
    let level_codes = selection
        .subject
        .as_deref()
        .and_then(|s| catalog.subject(s))
        .map(|s| s.level_codes())
        .unwrap_or_default();
    let (student_book, lesson_numbers) =
        match (selection.subject.as_deref(), selection.level.as_deref()) {
            (Some(subject), Some(level)) => (
                catalog
                    .level(subject, level)
                    .map(|l| l.student_book.clone())
                    .unwrap_or_default(),
                catalog.lesson_numbers(subject, level),
            ),
            _ => (String::new(), Vec::new()),
        };

    Ok(Json(FormResponse {
        success: true,
        selection,
        form,
        student_book,
        level_codes,
        lesson_numbers,
    }))
}
