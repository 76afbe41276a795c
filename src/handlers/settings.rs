// src/handlers/settings.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    forms::SettingsForm,
    lang::Strings,
    models::quiz::{GradeMethod, SaveSettingsRequest},
    rules::AccessManager,
};

/// Returns the settings form fields contributed by the access rules,
/// with the quiz's current values so `disabled_if` can be evaluated.
/// Manager only.
pub async fn get_settings_form(
    State(pool): State<SqlitePool>,
    State(strings): State<Arc<Strings>>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = AccessManager::load_quiz_settings(&pool, quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz {} not found", quiz_id)))?;

    let mut form = SettingsForm::new();
    AccessManager::add_settings_form_fields(&mut form, &strings);

    Ok(Json(serde_json::json!({
        "quiz_id": quiz.id,
        "values": {
            "grademethod": quiz.grademethod,
            "failgradeenabled": quiz.failgradeenabled,
        },
        "form": form,
    })))
}

/// Saves a quiz's grade method and access rule settings.
///
/// * Grade method and rule settings are written in one transaction.
/// * Manager only.
pub async fn save_settings(
    State(pool): State<SqlitePool>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<SaveSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let grademethod = GradeMethod::try_from(payload.grademethod).map_err(AppError::BadRequest)?;

    // Dropped without commit on any early return, which rolls back
    let mut tx = pool.begin().await?;

    let result = sqlx::query("UPDATE quizzes SET grademethod = ? WHERE id = ?")
        .bind(grademethod.as_i64())
        .bind(quiz_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update quiz {}: {:?}", quiz_id, e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Quiz {} not found", quiz_id)));
    }

    let mut quiz = AccessManager::load_quiz_settings(&mut *tx, quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz {} not found", quiz_id)))?;
    quiz.failgradeenabled = payload.failgradeenabled;

    AccessManager::save_settings(&mut *tx, &quiz).await?;
    tx.commit().await?;
    tracing::info!("Saved access settings for quiz {}", quiz_id);

    let saved = AccessManager::load_quiz_settings(&pool, quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz {} not found", quiz_id)))?;

    Ok(Json(saved))
}

/// Removes every access rule setting of a quiz.
/// Manager only.
pub async fn delete_settings(
    State(pool): State<SqlitePool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    AccessManager::delete_settings(&pool, quiz_id).await?;
    tracing::info!("Deleted access settings for quiz {}", quiz_id);
    Ok(StatusCode::NO_CONTENT)
}
