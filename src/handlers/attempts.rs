// src/handlers/attempts.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    grading::SqlGradebook,
    lang::Strings,
    models::attempt::{AttemptCheckResponse, AttemptRecord},
    rules::AccessManager,
    utils::jwt::Claims,
};

/// Attempt states that count as previous attempts.
const CLOSED_STATES: &str = "'finished', 'abandoned'";

/// Checks whether the caller may start a new attempt on a quiz.
///
/// * Loads the quiz with its rule settings.
/// * Counts the caller's closed attempts and picks the latest one.
/// * Asks every active rule; any reason blocks the attempt.
pub async fn check_attempt(
    State(pool): State<SqlitePool>,
    State(strings): State<Arc<Strings>>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let quiz = AccessManager::load_quiz_settings(&pool, quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz {} not found", quiz_id)))?;

    let num_previous_attempts: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM quiz_attempts WHERE quiz = ? AND userid = ? AND state IN ({})",
        CLOSED_STATES
    ))
    .bind(quiz_id)
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    let last_attempt = sqlx::query_as::<_, AttemptRecord>(&format!(
        r#"
        SELECT id, quiz, userid, attempt, state
        FROM quiz_attempts
        WHERE quiz = ? AND userid = ? AND state IN ({})
        ORDER BY attempt DESC
        LIMIT 1
        "#,
        CLOSED_STATES
    ))
    .bind(quiz_id)
    .bind(user_id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch last attempt: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let manager = AccessManager::new(quiz, Utc::now(), false);
    let gradebook = SqlGradebook::new(pool.clone());
    let reasons = manager
        .prevent_new_attempt(
            &gradebook,
            &strings,
            num_previous_attempts,
            last_attempt.as_ref(),
        )
        .await?;

    Ok(Json(AttemptCheckResponse {
        allowed: reasons.is_empty(),
        num_previous_attempts,
        reasons,
    }))
}
