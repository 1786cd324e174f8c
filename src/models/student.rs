//! Student model

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;
use chrono::{DateTime, Utc};

use super::FeatureRecord;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub features: FeatureRecord,
    /// Actual exam score, once known
    pub exam_score: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateStudent<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub features: &'a FeatureRecord,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct StudentListQuery {
    #[validate(range(min = 1, max = 500, message = "limit must be between 1 and 500"))]
    pub limit: Option<i64>,
    #[validate(range(min = 0, message = "offset must not be negative"))]
    pub offset: Option<i64>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }

    pub async fn create<'e, E>(executor: E, data: CreateStudent<'_>) -> Result<Self, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let f = data.features;
        sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (
                first_name, last_name,
                hours_studied, attendance, previous_scores, tutoring_sessions, sleep_hours,
                physical_activity, motivation_level, parental_involvement, access_to_resources,
                internet_access, family_income, teacher_quality, peer_influence,
                learning_disabilities, distance_from_home
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#
        )
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(f.hours_studied)
        .bind(f.attendance)
        .bind(f.previous_scores)
        .bind(f.tutoring_sessions)
        .bind(f.sleep_hours)
        .bind(f.physical_activity)
        .bind(&f.motivation_level)
        .bind(&f.parental_involvement)
        .bind(&f.access_to_resources)
        .bind(&f.internet_access)
        .bind(&f.family_income)
        .bind(&f.teacher_quality)
        .bind(&f.peer_influence)
        .bind(&f.learning_disabilities)
        .bind(&f.distance_from_home)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, query: StudentListQuery) -> Result<Vec<Self>, sqlx::Error> {
        let limit = query.limit.unwrap_or(50);
        let offset = query.offset.unwrap_or(0);

        sqlx::query_as::<_, Student>(
            "SELECT * FROM students ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}
