//! Batch (class list) analysis handler

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, AppResult, AppError};
use crate::dataset::{self, ClassRow};
use crate::feedback::{FeedbackResult, RiskBand};
use crate::models::FeatureRecord;
use super::analysis::{loaded_model, stored_factors, Analysis};

#[derive(Debug, Deserialize, Validate)]
pub struct BatchRequest {
    #[validate(length(min = 1, message = "students must not be empty"))]
    pub students: Vec<BatchStudent>,
    #[serde(default)]
    pub save: bool,
}

/// One row of an uploaded class list: optional names plus feature columns.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BatchStudent {
    #[validate(length(max = 100, message = "first_name must be at most 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 100, message = "last_name must be at most 100 characters"))]
    pub last_name: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub features: FeatureRecord,
}

impl From<ClassRow> for BatchStudent {
    fn from(row: ClassRow) -> Self {
        Self {
            first_name: row.first_name,
            last_name: row.last_name,
            features: row.features,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
pub struct BatchResult {
    pub index: usize,
    pub first_name: String,
    pub last_name: String,
    pub predicted_score: f64,
    pub feedback: FeedbackResult,
    pub prediction_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchResult>,
    pub distribution: BTreeMap<&'static str, usize>,
    pub average_score: f64,
    pub saved: usize,
}

/// Predict and evaluate a whole class, optionally storing every row
pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> AppResult<Json<BatchResponse>> {
    req.validate()?;
    run(&state, req.students, req.save).await.map(Json)
}

/// Same as [`analyze`] for a CSV class list sent as the request body
pub async fn upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: String,
) -> AppResult<Json<BatchResponse>> {
    let students: Vec<BatchStudent> = dataset::read_class_list(body.as_bytes())
        .map_err(|e| AppError::ValidationError(format!("Invalid class list: {e}")))?
        .into_iter()
        .map(BatchStudent::from)
        .collect();
    if students.is_empty() {
        return Err(AppError::ValidationError("Class list has no rows".to_string()));
    }

    run(&state, students, query.save).await.map(Json)
}

/// Validates every row before predicting. When saving, all rows go into one
/// transaction: either the whole class is stored or nothing is.
async fn run(state: &AppState, students: Vec<BatchStudent>, save: bool) -> AppResult<BatchResponse> {
    if students.len() > state.config.max_batch_size {
        return Err(AppError::ValidationError(format!(
            "At most {} students per batch",
            state.config.max_batch_size
        )));
    }
    for (index, row) in students.iter().enumerate() {
        row.validate()
            .map_err(|e| AppError::ValidationError(format!("students[{index}]: {e}")))?;
    }

    let model = loaded_model(state).await?;
    tracing::info!("Batch analysis of {} students", students.len());

    let factors = stored_factors(&model);
    let mut tx = if save { Some(state.pool.begin().await?) } else { None };
    let mut results = Vec::with_capacity(students.len());
    let mut saved = 0;

    for (index, row) in students.into_iter().enumerate() {
        let first_name = row.first_name.unwrap_or_else(|| "Student".to_string());
        let last_name = row.last_name.unwrap_or_else(|| (index + 1).to_string());

        let score = (model.predict(&row.features) * 10.0).round() / 10.0;
        let analysis = Analysis::from_score(score, &row.features);

        let prediction_id = match tx.as_mut() {
            Some(tx) => {
                let (_, prediction) = analysis
                    .save(tx, &first_name, &last_name, &row.features, Some(factors.clone()))
                    .await
                    .map_err(|e| {
                        tracing::warn!("Batch row {} failed, rolling back: {}", index, e);
                        AppError::from(e)
                    })?;
                saved += 1;
                Some(prediction.id)
            }
            None => None,
        };

        results.push(BatchResult {
            index,
            first_name,
            last_name,
            predicted_score: analysis.predicted_score,
            feedback: analysis.feedback,
            prediction_id,
        });
    }

    if let Some(tx) = tx {
        tx.commit().await?;
        tracing::info!("Saved {} batch analyses", saved);
    }
    Ok(summarize(results, saved))
}

fn summarize(results: Vec<BatchResult>, saved: usize) -> BatchResponse {
    let mut distribution: BTreeMap<&'static str, usize> =
        RiskBand::ALL.iter().map(|band| (band.label(), 0)).collect();
    for result in &results {
        *distribution.entry(result.feedback.risk_label).or_default() += 1;
    }

    let average_score = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.predicted_score).sum::<f64>() / results.len() as f64
    };

    BatchResponse { results, distribution, average_score, saved }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::evaluate;

    fn result(index: usize, score: f64) -> BatchResult {
        BatchResult {
            index,
            first_name: "Student".to_string(),
            last_name: (index + 1).to_string(),
            predicted_score: score,
            feedback: evaluate(score, &FeatureRecord::default()),
            prediction_id: None,
        }
    }

    #[test]
    fn test_summary_counts_every_band() {
        let summary = summarize(vec![result(0, 90.0), result(1, 45.0), result(2, 30.0)], 0);

        assert_eq!(summary.distribution["Low Risk"], 1);
        assert_eq!(summary.distribution["Safe Zone"], 0);
        assert_eq!(summary.distribution["Medium Risk"], 0);
        assert_eq!(summary.distribution["High Risk"], 2);
        assert_eq!(summary.average_score, 55.0);
    }

    #[test]
    fn test_row_validation() {
        let long_name: BatchStudent =
            serde_json::from_value(serde_json::json!({ "first_name": "a".repeat(300) })).unwrap();
        assert!(long_name.validate().is_err());

        let long_category: BatchStudent =
            serde_json::from_value(serde_json::json!({ "motivation_level": "m".repeat(50) })).unwrap();
        let errors = long_category.validate().unwrap_err();
        assert!(errors.errors().contains_key("features"));

        let ok: BatchStudent = serde_json::from_value(
            serde_json::json!({ "first_name": "Ada", "motivation_level": "High" }),
        )
        .unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_flattened_row() {
        let row: BatchStudent = serde_json::from_str(
            r#"{"first_name": "Ada", "hours_studied": 4, "sleep_hours": 5}"#,
        )
        .unwrap();

        assert_eq!(row.first_name.as_deref(), Some("Ada"));
        assert_eq!(row.last_name, None);
        assert_eq!(row.features.sleep_hours, Some(5));
    }
}
