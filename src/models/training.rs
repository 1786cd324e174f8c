//! Training data table

use sqlx::{PgPool, Postgres, QueryBuilder};

use super::TrainingRow;

/// Rows per INSERT; 16 binds each keeps well under the Postgres bind limit.
const INSERT_CHUNK: usize = 1000;

pub struct TrainingData;

impl TrainingData {
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM training_data")
            .fetch_one(pool)
            .await
    }

    /// Insert `rows` only into an empty table. `None` means the table
    /// already held data and nothing was written.
    pub async fn seed(pool: &PgPool, rows: &[TrainingRow]) -> Result<Option<u64>, sqlx::Error> {
        if Self::count(pool).await? > 0 {
            return Ok(None);
        }
        Self::insert_many(pool, rows).await.map(Some)
    }

    pub async fn insert_many(pool: &PgPool, rows: &[TrainingRow]) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut inserted = 0;

        for chunk in rows.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO training_data (\
                    hours_studied, attendance, previous_scores, tutoring_sessions, sleep_hours, \
                    physical_activity, motivation_level, parental_involvement, access_to_resources, \
                    internet_access, family_income, teacher_quality, peer_influence, \
                    learning_disabilities, distance_from_home, exam_score) ",
            );
            builder.push_values(chunk, |mut b, row| {
                let f = &row.features;
                b.push_bind(f.hours_studied)
                    .push_bind(f.attendance)
                    .push_bind(f.previous_scores)
                    .push_bind(f.tutoring_sessions)
                    .push_bind(f.sleep_hours)
                    .push_bind(f.physical_activity)
                    .push_bind(f.motivation_level.clone())
                    .push_bind(f.parental_involvement.clone())
                    .push_bind(f.access_to_resources.clone())
                    .push_bind(f.internet_access.clone())
                    .push_bind(f.family_income.clone())
                    .push_bind(f.teacher_quality.clone())
                    .push_bind(f.peer_influence.clone())
                    .push_bind(f.learning_disabilities.clone())
                    .push_bind(f.distance_from_home.clone())
                    .push_bind(row.exam_score);
            });
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    pub async fn load_all(pool: &PgPool) -> Result<Vec<TrainingRow>, sqlx::Error> {
        sqlx::query_as::<_, TrainingRow>(
            r#"
            SELECT hours_studied, attendance, previous_scores, tutoring_sessions, sleep_hours,
                   physical_activity, motivation_level, parental_involvement, access_to_resources,
                   internet_access, family_income, teacher_quality, peer_influence,
                   learning_disabilities, distance_from_home, exam_score
            FROM training_data
            ORDER BY id
            "#
        )
        .fetch_all(pool)
        .await
    }
}
