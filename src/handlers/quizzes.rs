// src/handlers/quizzes.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::{error::AppError, lang::Strings, rules::AccessManager};

/// Lists all quizzes with their access rule settings.
pub async fn list_quizzes(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let quizzes = AccessManager::list_quizzes_with_settings(&pool).await?;
    Ok(Json(quizzes))
}

/// Describes the access rules active on a quiz.
pub async fn describe_rules(
    State(pool): State<SqlitePool>,
    State(strings): State<Arc<Strings>>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = AccessManager::load_quiz_settings(&pool, quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz {} not found", quiz_id)))?;

    let manager = AccessManager::new(quiz, Utc::now(), false);

    Ok(Json(serde_json::json!({
        "quiz_id": quiz_id,
        "rules": manager.describe_rules(&strings),
    })))
}
