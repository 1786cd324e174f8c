//! AI prediction model

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiPrediction {
    pub id: Uuid,
    pub student_id: Uuid,
    pub prediction_date: DateTime<Utc>,
    pub predicted_score: f64,
    pub risk_level: String,
    pub top_factors: Option<String>,
    /// Parent-only summary, never teacher notes
    pub recommendation: String,
}

#[derive(Debug, Clone)]
pub struct CreatePrediction<'a> {
    pub student_id: Uuid,
    pub predicted_score: f64,
    pub risk_level: &'a str,
    pub top_factors: Option<String>,
    pub recommendation: &'a str,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HistoryEntry {
    pub prediction_id: Uuid,
    pub student_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub predicted_score: f64,
    pub risk_level: String,
    pub prediction_date: DateTime<Utc>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistorySummary {
    pub total: i64,
    pub average_score: Option<f64>,
    pub high_risk: i64,
}

#[derive(Debug, Deserialize, Default, Validate)]
pub struct HistoryFilter {
    pub risk_level: Option<String>,
    #[validate(range(min = 1, max = 500, message = "limit must be between 1 and 500"))]
    pub limit: Option<i64>,
    #[validate(range(min = 0, message = "offset must not be negative"))]
    pub offset: Option<i64>,
}

impl AiPrediction {
    pub async fn create<'e, E>(executor: E, data: CreatePrediction<'_>) -> Result<Self, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as::<_, AiPrediction>(
            r#"
            INSERT INTO ai_predictions (student_id, predicted_score, risk_level, top_factors, recommendation)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#
        )
        .bind(data.student_id)
        .bind(data.predicted_score)
        .bind(data.risk_level)
        .bind(&data.top_factors)
        .bind(data.recommendation)
        .fetch_one(executor)
        .await
    }

    pub async fn list_by_student(pool: &PgPool, student_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AiPrediction>(
            "SELECT * FROM ai_predictions WHERE student_id = $1 ORDER BY prediction_date DESC"
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }

    pub async fn history(pool: &PgPool, filter: &HistoryFilter) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        let limit = filter.limit.unwrap_or(100);
        let offset = filter.offset.unwrap_or(0);

        sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT p.id AS prediction_id, s.id AS student_id, s.first_name, s.last_name,
                   p.predicted_score, p.risk_level, p.prediction_date, p.recommendation
            FROM ai_predictions p
            JOIN students s ON p.student_id = s.id
            WHERE ($1::VARCHAR IS NULL OR p.risk_level = $1)
            ORDER BY p.prediction_date DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(&filter.risk_level)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn summary(pool: &PgPool, high_risk_label: &str) -> Result<HistorySummary, sqlx::Error> {
        let (total, average_score, high_risk): (i64, Option<f64>, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   AVG(predicted_score),
                   COUNT(*) FILTER (WHERE risk_level = $1)
            FROM ai_predictions
            "#
        )
        .bind(high_risk_label)
        .fetch_one(pool)
        .await?;

        Ok(HistorySummary { total, average_score, high_risk })
    }
}
