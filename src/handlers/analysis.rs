//! Single-student analysis handlers

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, AppResult, AppError};
use crate::feedback::{self, FeedbackResult, ParentReport};
use crate::ml::{FactorImportance, ScoreModel};
use crate::models::{AiPrediction, CreatePrediction, CreateStudent, FeatureRecord, Student};

/// Factors returned with each analysis
const TOP_FACTORS: usize = 5;
/// Factors stored with each prediction
const STORED_FACTORS: usize = 3;

#[derive(Debug, Deserialize, Validate)]
pub struct AnalysisRequest {
    #[validate(length(min = 1, max = 100, message = "first_name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last_name is required"))]
    pub last_name: String,
    #[serde(default)]
    #[validate(nested)]
    pub features: FeatureRecord,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub predicted_score: f64,
    pub feedback: FeedbackResult,
    pub top_factors: Vec<FactorImportance>,
    pub student_id: Option<Uuid>,
    pub prediction_id: Option<Uuid>,
}

/// Prediction plus feedback for one record.
pub struct Analysis {
    pub predicted_score: f64,
    pub feedback: FeedbackResult,
}

impl Analysis {
    pub fn run(model: &ScoreModel, record: &FeatureRecord) -> Self {
        Self::from_score(model.predict(record), record)
    }

    pub fn from_score(predicted_score: f64, record: &FeatureRecord) -> Self {
        Self {
            predicted_score,
            feedback: feedback::evaluate(predicted_score, record),
        }
    }

    /// Insert the student and this prediction on `conn`. The caller owns
    /// the transaction.
    pub async fn save(
        &self,
        conn: &mut PgConnection,
        first_name: &str,
        last_name: &str,
        record: &FeatureRecord,
        top_factors: Option<String>,
    ) -> Result<(Student, AiPrediction), sqlx::Error> {
        let student = Student::create(&mut *conn, CreateStudent {
            first_name,
            last_name,
            features: record,
        }).await?;

        let prediction = AiPrediction::create(&mut *conn, CreatePrediction {
            student_id: student.id,
            predicted_score: self.predicted_score,
            risk_level: self.feedback.risk_label,
            top_factors,
            recommendation: &self.feedback.final_text_for_db,
        }).await?;

        Ok((student, prediction))
    }
}

pub fn stored_factors(model: &ScoreModel) -> String {
    model
        .top_factors(STORED_FACTORS)
        .iter()
        .map(|f| f.name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) async fn loaded_model(state: &AppState) -> AppResult<std::sync::Arc<ScoreModel>> {
    state.model.current().await.ok_or(AppError::ModelUnavailable)
}

/// Predict, evaluate and optionally store one student
pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> AppResult<Json<AnalysisResponse>> {
    req.validate()?;
    let model = loaded_model(&state).await?;

    let analysis = Analysis::run(&model, &req.features);
    tracing::debug!(
        "Analysis for {} {}: {:.1} ({})",
        req.first_name, req.last_name, analysis.predicted_score, analysis.feedback.risk_label
    );

    let (student_id, prediction_id) = if req.save {
        let mut tx = state.pool.begin().await?;
        let (student, prediction) = analysis
            .save(&mut tx, &req.first_name, &req.last_name, &req.features, Some(stored_factors(&model)))
            .await?;
        tx.commit().await?;

        tracing::info!("Saved analysis for {} ({})", student.full_name(), analysis.feedback.risk_label);
        (Some(student.id), Some(prediction.id))
    } else {
        (None, None)
    };

    Ok(Json(AnalysisResponse {
        predicted_score: analysis.predicted_score,
        feedback: analysis.feedback,
        top_factors: model.top_factors(TOP_FACTORS),
        student_id,
        prediction_id,
    }))
}

/// Parent report as a downloadable HTML page
pub async fn report(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;
    let model = loaded_model(&state).await?;

    let analysis = Analysis::run(&model, &req.features);
    let student_name = format!("{} {}", req.first_name, req.last_name);
    let report = ParentReport {
        student_name: &student_name,
        score: analysis.predicted_score,
        feedback: &analysis.feedback,
    };

    let disposition = format!("attachment; filename=\"{}\"", report.file_name());
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Html(report.render())))
}
