//! Model handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppState, AppResult, AppError};
use crate::ml::{FactorImportance, ModelMetrics, ScoreModel};
use crate::models::TrainingData;
use super::analysis::loaded_model;

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub metrics: ModelMetrics,
    pub feature_importances: Vec<FactorImportance>,
}

impl ModelInfo {
    fn of(model: &ScoreModel) -> Self {
        Self {
            metrics: model.metrics().clone(),
            feature_importances: model.feature_importances(),
        }
    }
}

/// Metrics of the live model
pub async fn info(State(state): State<AppState>) -> AppResult<Json<ModelInfo>> {
    let model = loaded_model(&state).await?;
    Ok(Json(ModelInfo::of(&model)))
}

/// Retrain from the training_data table and swap the live model
pub async fn train(State(state): State<AppState>) -> AppResult<Json<ModelInfo>> {
    let _training = state.model.lock_training().await;
    let rows = TrainingData::load_all(&state.pool).await?;
    tracing::info!("Retraining on {} stored rows", rows.len());

    let model_dir = state.config.model_dir.clone();
    let model = tokio::task::spawn_blocking(move || {
        let model = ScoreModel::train(&rows)?;
        model.save(&model_dir)?;
        Ok::<_, AppError>(model)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("training task failed: {e}")))??;

    let model = state.model.replace(model).await;
    Ok(Json(ModelInfo::of(&model)))
}
