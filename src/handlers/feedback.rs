//! Feedback handler - rule engine only, caller supplies the score

use axum::Json;
use serde::Deserialize;

use crate::feedback::{self, FeedbackResult};
use crate::models::FeatureRecord;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub score: f64,
    #[serde(default)]
    pub record: FeatureRecord,
}

pub async fn evaluate(Json(req): Json<FeedbackRequest>) -> Json<FeedbackResult> {
    Json(feedback::evaluate(req.score, &req.record))
}
