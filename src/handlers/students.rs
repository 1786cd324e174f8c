//! Students handlers

use axum::{extract::{State, Path, Query}, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, AppResult, AppError};
use crate::models::{AiPrediction, Student, StudentListQuery};

/// List stored students
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<StudentListQuery>,
) -> AppResult<Json<Vec<Student>>> {
    query.validate()?;
    let students = Student::list(&state.pool, query).await?;
    Ok(Json(students))
}

/// Get single student
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Student>> {
    let student = Student::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    Ok(Json(student))
}

/// Predictions stored for one student
pub async fn predictions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<AiPrediction>>> {
    Student::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    let predictions = AiPrediction::list_by_student(&state.pool, id).await?;
    Ok(Json(predictions))
}
