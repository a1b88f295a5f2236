//! Reorder endpoints
//!
//! `from` and `to` are positions in the current catalog order. The response
//! lists the `display_order` values that were written.

use axum::{
    extract::{Path, State},
    Json,
};
use lcm_common::ordering::OrderUpdate;
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReorderRequest {
    pub from: Option<usize>,
    pub to: Option<usize>,
}

impl ReorderRequest {
    fn positions(&self) -> ApiResult<(usize, usize)> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Ok((from, to)),
            _ => Err(ApiError::BadRequest(
                "Both 'from' and 'to' are required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub success: bool,
    pub updates: Vec<OrderUpdate>,
}

/// POST /api/order/subjects
pub async fn reorder_subjects(
    State(state): State<AppState>,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<Json<ReorderResponse>> {
    let (from, to) = request.positions()?;
    let updates = state
        .status
        .track(
            "reorder-subjects".to_string(),
            state.repository.reorder_subjects(from, to),
        )
        .await?;

    Ok(Json(ReorderResponse {
        success: true,
        updates,
    }))
}

/// POST /api/order/subjects/:code/levels
pub async fn reorder_levels(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<Json<ReorderResponse>> {
    let (from, to) = request.positions()?;
    let updates = state
        .status
        .track(
            format!("reorder-levels:{}", subject),
            state.repository.reorder_levels(&subject, from, to),
        )
        .await?;

    Ok(Json(ReorderResponse {
        success: true,
        updates,
    }))
}
