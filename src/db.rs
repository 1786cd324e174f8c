//! Database module - PostgreSQL connection and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Strip credentials before a connection URL reaches the logs.
pub fn redact_url(database_url: &str) -> &str {
    database_url.rsplit('@').next().unwrap_or("***")
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Students (real records entered through the API)
CREATE TABLE IF NOT EXISTS students (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    first_name VARCHAR(100),
    last_name VARCHAR(100),
    hours_studied INT,
    attendance INT,
    previous_scores INT,
    tutoring_sessions INT,
    sleep_hours INT,
    physical_activity INT,
    motivation_level VARCHAR(20),
    parental_involvement VARCHAR(20),
    access_to_resources VARCHAR(20),
    internet_access VARCHAR(20),
    family_income VARCHAR(20),
    teacher_quality VARCHAR(20),
    peer_influence VARCHAR(20),
    learning_disabilities VARCHAR(20),
    distance_from_home VARCHAR(20),
    exam_score INT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Training data (public dataset + synthetic balance rows)
CREATE TABLE IF NOT EXISTS training_data (
    id BIGSERIAL PRIMARY KEY,
    hours_studied INT,
    attendance INT,
    previous_scores INT,
    tutoring_sessions INT,
    sleep_hours INT,
    physical_activity INT,
    motivation_level VARCHAR(20),
    parental_involvement VARCHAR(20),
    access_to_resources VARCHAR(20),
    internet_access VARCHAR(20),
    family_income VARCHAR(20),
    teacher_quality VARCHAR(20),
    peer_influence VARCHAR(20),
    learning_disabilities VARCHAR(20),
    distance_from_home VARCHAR(20),
    exam_score DOUBLE PRECISION NOT NULL
);

-- AI predictions
CREATE TABLE IF NOT EXISTS ai_predictions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    student_id UUID NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    prediction_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    predicted_score DOUBLE PRECISION NOT NULL,
    risk_level VARCHAR(20) NOT NULL,
    top_factors VARCHAR(255),
    recommendation VARCHAR(255) NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_students_created ON students(created_at);
CREATE INDEX IF NOT EXISTS idx_predictions_student ON ai_predictions(student_id);
CREATE INDEX IF NOT EXISTS idx_predictions_date ON ai_predictions(prediction_date);
CREATE INDEX IF NOT EXISTS idx_predictions_risk ON ai_predictions(risk_level);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url() {
        assert_eq!(redact_url("postgres://edu:secret@db:5432/edu_db"), "db:5432/edu_db");
        assert_eq!(redact_url("postgres://localhost/edu_db"), "postgres://localhost/edu_db");
    }
}
