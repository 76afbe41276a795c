// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// How a learner's attempts are combined into the quiz grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum GradeMethod {
    Highest = 1,
    Average = 2,
    FirstAttempt = 3,
    LastAttempt = 4,
}

impl GradeMethod {
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

impl From<GradeMethod> for i64 {
    fn from(method: GradeMethod) -> Self {
        method.as_i64()
    }
}

impl TryFrom<i64> for GradeMethod {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(GradeMethod::Highest),
            2 => Ok(GradeMethod::Average),
            3 => Ok(GradeMethod::FirstAttempt),
            4 => Ok(GradeMethod::LastAttempt),
            other => Err(format!("Unknown grade method: {}", other)),
        }
    }
}

/// Represents a row of the 'quizzes' table joined with every access rule's settings.
#[derive(Debug, Clone, Serialize)]
pub struct Quiz {
    pub id: i64,
    pub course: i64,
    pub name: String,
    pub grademethod: GradeMethod,

    /// Whether the pass-grade rule is switched on for this quiz.
    /// False when the quiz has no row in `quizaccess_failgrade`.
    pub failgradeenabled: bool,
}

/// Raw shape returned by the settings loader before the grade method is checked.
#[derive(Debug, FromRow)]
pub struct QuizRow {
    pub id: i64,
    pub course: i64,
    pub name: String,
    pub grademethod: i64,
    pub failgradeenabled: i64,
}

impl TryFrom<QuizRow> for Quiz {
    type Error = String;

    fn try_from(row: QuizRow) -> Result<Self, Self::Error> {
        Ok(Quiz {
            id: row.id,
            course: row.course,
            name: row.name,
            grademethod: GradeMethod::try_from(row.grademethod)?,
            failgradeenabled: row.failgradeenabled != 0,
        })
    }
}

/// DTO for saving a quiz's access settings.
#[derive(Debug, Deserialize, Validate)]
pub struct SaveSettingsRequest {
    #[validate(range(min = 1, max = 4, message = "Grade method must be between 1 and 4."))]
    pub grademethod: i64,
    #[serde(default)]
    pub failgradeenabled: bool,
}
