//! Training pipeline and model artifacts.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use super::encoder::CategoryEncoder;
use super::regression::{RidgeRegression, Scaler};
use super::TrainError;
use crate::models::{FeatureRecord, FeatureValue, TrainingRow, FEATURE_COLUMNS};

pub const MODEL_FILE: &str = "student_score_model.json";
pub const METRICS_FILE: &str = "metrics.json";

pub const MIN_TRAINING_ROWS: usize = 10;
const TEST_FRACTION: f64 = 0.2;
const SPLIT_SEED: u64 = 42;
const RIDGE_LAMBDA: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub mae: f64,
    pub r2: f64,
    pub last_trained: String,
    pub train_rows: usize,
    pub test_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorImportance {
    pub name: &'static str,
    pub importance: f64,
}

/// Everything needed to turn a [`FeatureRecord`] into a predicted score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreModel {
    encoders: BTreeMap<String, CategoryEncoder>,
    scaler: Scaler,
    regression: RidgeRegression,
    metrics: ModelMetrics,
}

impl ScoreModel {
    /// Seeded 80/20 split, fit on the larger part, score on the rest.
    pub fn train(rows: &[TrainingRow]) -> Result<Self, TrainError> {
        if rows.len() < MIN_TRAINING_ROWS {
            return Err(TrainError::InsufficientData {
                rows: rows.len(),
                min: MIN_TRAINING_ROWS,
            });
        }

        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(SPLIT_SEED));
        let test_len = ((rows.len() as f64) * TEST_FRACTION).ceil() as usize;
        let (test_idx, train_idx) = order.split_at(test_len);

        let encoders: BTreeMap<String, CategoryEncoder> = FEATURE_COLUMNS
            .iter()
            .filter(|column| FeatureRecord::is_categorical(column))
            .map(|column| {
                let values = train_idx.iter().map(|&i| match rows[i].features.value(column) {
                    Some(FeatureValue::Categorical(v)) => v,
                    _ => None,
                });
                (column.to_string(), CategoryEncoder::fit(values))
            })
            .collect();

        let raw_train: Vec<Vec<f64>> =
            train_idx.iter().map(|&i| encode(&encoders, &rows[i].features)).collect();
        let targets: Vec<f64> = train_idx.iter().map(|&i| rows[i].exam_score).collect();

        let scaler = Scaler::fit(&raw_train);
        let scaled: Vec<Vec<f64>> = raw_train.iter().map(|r| scaler.transform(r)).collect();
        let regression = RidgeRegression::fit(&scaled, &targets, RIDGE_LAMBDA)?;

        let mut model = Self {
            encoders,
            scaler,
            regression,
            metrics: ModelMetrics {
                mae: 0.0,
                r2: 0.0,
                last_trained: chrono::Local::now().format("%d-%m-%Y %H:%M").to_string(),
                train_rows: train_idx.len(),
                test_rows: test_idx.len(),
            },
        };

        let predicted: Vec<f64> = test_idx.iter().map(|&i| model.predict(&rows[i].features)).collect();
        let actual: Vec<f64> = test_idx.iter().map(|&i| rows[i].exam_score).collect();
        model.metrics.mae = mean_absolute_error(&actual, &predicted);
        model.metrics.r2 = r2_score(&actual, &predicted);

        tracing::info!(
            "Model trained on {} rows (MAE {:.2}, R2 {:.2})",
            model.metrics.train_rows,
            model.metrics.mae,
            model.metrics.r2
        );
        Ok(model)
    }

    /// Predicted exam score, clamped to 0..=100.
    pub fn predict(&self, record: &FeatureRecord) -> f64 {
        let row = self.scaler.transform(&encode(&self.encoders, record));
        self.regression.predict(&row).clamp(0.0, 100.0)
    }

    pub fn metrics(&self) -> &ModelMetrics {
        &self.metrics
    }

    /// Share of the summed absolute coefficients per feature column, most
    /// influential first. One-hot slots count toward their source column.
    pub fn feature_importances(&self) -> Vec<FactorImportance> {
        let mut weights = self.regression.weights.iter();
        let per_column: Vec<(&'static str, f64)> = FEATURE_COLUMNS
            .iter()
            .map(|&name| {
                let slots = self.encoders.get(name).map_or(1, |e| e.classes().len());
                let magnitude: f64 = weights.by_ref().take(slots).map(|w| w.abs()).sum();
                (name, magnitude)
            })
            .collect();

        let total: f64 = per_column.iter().map(|(_, m)| m).sum();
        let mut factors: Vec<FactorImportance> = per_column
            .into_iter()
            .map(|(name, magnitude)| FactorImportance {
                name,
                importance: if total > 0.0 { magnitude / total } else { 0.0 },
            })
            .collect();

        factors.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        factors
    }

    pub fn top_factors(&self, n: usize) -> Vec<FactorImportance> {
        let mut factors = self.feature_importances();
        factors.truncate(n);
        factors
    }

    pub fn save(&self, dir: &Path) -> Result<(), TrainError> {
        fs::create_dir_all(dir)?;
        write_atomic(&dir.join(MODEL_FILE), &serde_json::to_vec(self)?)?;
        write_atomic(&dir.join(METRICS_FILE), &serde_json::to_vec_pretty(&self.metrics)?)?;
        tracing::info!("Model artifacts saved to {}", dir.display());
        Ok(())
    }

    /// Returns `Ok(None)` when no model has been trained into `dir` yet.
    pub fn load(dir: &Path) -> Result<Option<Self>, TrainError> {
        let path = dir.join(MODEL_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let model = serde_json::from_slice(&fs::read(path)?)?;
        Ok(Some(model))
    }
}

/// Write to a sibling temp file, then rename over `path`. Readers see the
/// old or the new file, never a partial one.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

fn encode(encoders: &BTreeMap<String, CategoryEncoder>, record: &FeatureRecord) -> Vec<f64> {
    let mut row = Vec::with_capacity(FEATURE_COLUMNS.len() * 2);
    for column in FEATURE_COLUMNS {
        match record.value(column) {
            Some(FeatureValue::Categorical(v)) => {
                if let Some(encoder) = encoders.get(column) {
                    encoder.encode_into(v, &mut row);
                }
            }
            Some(FeatureValue::Numeric(v)) => row.push(v.map_or(0.0, f64::from)),
            None => row.push(0.0),
        }
    }
    row
}

fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().max(1) as f64;
    actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum::<f64>() / n
}

fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().max(1) as f64;
    let mean = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::synthetic::SyntheticGenerator;
    use tempfile::tempdir;

    fn synthetic_rows(n: usize) -> Vec<TrainingRow> {
        SyntheticGenerator::seeded(7).generate(n)
    }

    #[test]
    fn test_rejects_tiny_dataset() {
        let err = ScoreModel::train(&synthetic_rows(5)).unwrap_err();
        assert!(matches!(err, TrainError::InsufficientData { rows: 5, min: 10 }));
    }

    #[test]
    fn test_learns_synthetic_formula() {
        let model = ScoreModel::train(&synthetic_rows(800)).unwrap();
        let metrics = model.metrics();

        assert_eq!(metrics.train_rows, 640);
        assert_eq!(metrics.test_rows, 160);
        assert!(metrics.r2 > 0.8, "r2 = {}", metrics.r2);
        assert!(metrics.mae < 6.0, "mae = {}", metrics.mae);
    }

    #[test]
    fn test_previous_scores_dominates_importance() {
        let model = ScoreModel::train(&synthetic_rows(800)).unwrap();
        let top = model.top_factors(5);

        assert_eq!(top.len(), 5);
        assert_eq!(top[0].name, "previous_scores");
        let total: f64 = model.feature_importances().iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_is_clamped_and_handles_sparse_records() {
        let model = ScoreModel::train(&synthetic_rows(300)).unwrap();

        let empty = model.predict(&FeatureRecord::default());
        assert!((0.0..=100.0).contains(&empty));

        let absurd = FeatureRecord { previous_scores: Some(100_000), ..Default::default() };
        assert_eq!(model.predict(&absurd), 100.0);
    }

    #[test]
    fn test_artifacts_reload() {
        let dir = tempdir().unwrap();
        assert!(ScoreModel::load(dir.path()).unwrap().is_none());

        let model = ScoreModel::train(&synthetic_rows(200)).unwrap();
        model.save(dir.path()).unwrap();
        assert!(dir.path().join(METRICS_FILE).exists());

        let loaded = ScoreModel::load(dir.path()).unwrap().unwrap();
        let probe = FeatureRecord {
            hours_studied: Some(20),
            previous_scores: Some(75),
            motivation_level: Some("High".to_string()),
            ..Default::default()
        };
        assert!((loaded.predict(&probe) - model.predict(&probe)).abs() < 1e-9);
        assert_eq!(loaded.metrics().train_rows, model.metrics().train_rows);
        assert_eq!(loaded.metrics().last_trained, model.metrics().last_trained);
    }

    #[test]
    fn test_save_replaces_previous_artifacts() {
        let dir = tempdir().unwrap();
        ScoreModel::train(&synthetic_rows(100)).unwrap().save(dir.path()).unwrap();
        let second = ScoreModel::train(&synthetic_rows(300)).unwrap();
        second.save(dir.path()).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2, "{names:?}");
        assert!(names.iter().all(|name| !name.ends_with(".tmp")));

        let metrics: ModelMetrics =
            serde_json::from_slice(&fs::read(dir.path().join(METRICS_FILE)).unwrap()).unwrap();
        assert_eq!(metrics.train_rows, second.metrics().train_rows);
        let loaded = ScoreModel::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.metrics().train_rows, 240);
    }

    #[test]
    fn test_r2_of_perfect_fit() {
        assert_eq!(r2_score(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 1.0);
        assert_eq!(mean_absolute_error(&[1.0, 2.0], &[2.0, 4.0]), 1.5);
    }
}
