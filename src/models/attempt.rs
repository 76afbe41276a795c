// src/models/attempt.rs

use serde::Serialize;
use sqlx::FromRow;

/// Represents the 'quiz_attempts' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttemptRecord {
    pub id: i64,
    pub quiz: i64,
    pub userid: i64,
    /// Sequence number of the attempt for this learner, starting at 1.
    pub attempt: i64,
    /// 'inprogress', 'overdue', 'finished' or 'abandoned'.
    pub state: String,
}

/// Response of the attempt-start check.
#[derive(Debug, Serialize)]
pub struct AttemptCheckResponse {
    pub allowed: bool,
    pub num_previous_attempts: i64,
    /// One localized message per rule that blocks the attempt.
    pub reasons: Vec<String>,
}
