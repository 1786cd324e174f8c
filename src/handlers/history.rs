//! Prediction history handler

use axum::{extract::{State, Query}, Json};
use serde::Serialize;
use validator::Validate;

use crate::{AppState, AppResult};
use crate::feedback::RiskBand;
use crate::models::{AiPrediction, HistoryEntry, HistoryFilter, HistorySummary};

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<HistoryEntry>,
    pub summary: HistorySummary,
}

/// Stored analyses, newest first, with aggregate figures
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<HistoryFilter>,
) -> AppResult<Json<HistoryResponse>> {
    filter.validate()?;
    let entries = AiPrediction::history(&state.pool, &filter).await?;
    let summary = AiPrediction::summary(&state.pool, RiskBand::High.label()).await?;
    Ok(Json(HistoryResponse { entries, summary }))
}
