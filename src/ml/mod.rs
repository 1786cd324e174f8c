//! Score prediction
//!
//! One-hot encoding + standardized ridge regression over the student feature
//! columns, trained from stored training rows and persisted as JSON.

pub mod encoder;
pub mod regression;
pub mod synthetic;
pub mod trainer;

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};

pub use trainer::{FactorImportance, ModelMetrics, ScoreModel};

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("need at least {min} training rows, got {rows}")]
    InsufficientData { rows: usize, min: usize },

    #[error("normal equations are singular")]
    Singular,

    #[error("model artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("model artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Live model slot shared by request handlers. Retraining swaps the `Arc`;
/// requests already holding the previous model finish with it.
#[derive(Clone, Default)]
pub struct ModelHandle {
    inner: Arc<RwLock<Option<Arc<ScoreModel>>>>,
    training: Arc<Mutex<()>>,
}

impl ModelHandle {
    pub fn new(model: Option<ScoreModel>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(model.map(Arc::new))),
            training: Arc::default(),
        }
    }

    /// Held for a whole retrain (fit, save, swap) so that runs never
    /// interleave their artifacts.
    pub async fn lock_training(&self) -> MutexGuard<'_, ()> {
        self.training.lock().await
    }

    pub async fn current(&self) -> Option<Arc<ScoreModel>> {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, model: ScoreModel) -> Arc<ScoreModel> {
        let model = Arc::new(model);
        *self.inner.write().await = Some(model.clone());
        model
    }
}
