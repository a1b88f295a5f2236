//! Catalog endpoint

use axum::{extract::State, Json};
use lcm_common::catalog::SubjectEntry;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub success: bool,
    /// Subjects, levels and lessons in display order
    pub subjects: Vec<SubjectEntry>,
    /// `data[subject][level][lesson_key]`
    pub data: Value,
    pub student_books: BTreeMap<String, String>,
    pub subject_names: BTreeMap<String, String>,
}

/// GET /api/catalog
pub async fn get_catalog(State(state): State<AppState>) -> ApiResult<Json<CatalogResponse>> {
    let catalog = state.repository.catalog().await?;

    Ok(Json(CatalogResponse {
        success: true,
        data: catalog.nested_data(),
        student_books: catalog.student_books(),
        subject_names: catalog.subject_names(),
        subjects: catalog.subjects,
    }))
}
