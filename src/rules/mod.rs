// src/rules/mod.rs

pub mod fail_grade;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    error::AppError,
    forms::SettingsForm,
    grading::Gradebook,
    lang::Strings,
    models::{
        attempt::AttemptRecord,
        quiz::{Quiz, QuizRow},
    },
};

use fail_grade::FailGradeRule;

/// Uniform contract of a quiz access rule.
#[async_trait]
pub trait AccessRule: Send + Sync {
    /// Short localized text listed with the quiz's active rules.
    fn description(&self, strings: &Strings) -> String;

    /// `Ok(None)` lets the attempt start; `Ok(Some(reason))` blocks it.
    async fn prevent_new_attempt(
        &self,
        gradebook: &dyn Gradebook,
        strings: &Strings,
        num_prev_attempts: i64,
        last_attempt: Option<&AttemptRecord>,
    ) -> Result<Option<String>, AppError>;
}

/// SQL fragments a rule contributes to the quiz settings query.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SettingsSql {
    pub fields: Vec<String>,
    pub joins: Vec<String>,
    /// Bound in order, before the loader's own parameters.
    pub params: Vec<i64>,
}

impl SettingsSql {
    fn merge(mut self, other: SettingsSql) -> Self {
        self.fields.extend(other.fields);
        self.joins.extend(other.joins);
        self.params.extend(other.params);
        self
    }
}

/// The set of rules active for one quiz at one moment.
pub struct AccessManager {
    quiz: Quiz,
    rules: Vec<Box<dyn AccessRule>>,
}

impl AccessManager {
    pub fn new(quiz: Quiz, time_now: DateTime<Utc>, can_ignore_time_limits: bool) -> Self {
        let mut rules: Vec<Box<dyn AccessRule>> = Vec::new();
        if let Some(rule) = FailGradeRule::make(&quiz, time_now, can_ignore_time_limits) {
            rules.push(Box::new(rule));
        }

        Self { quiz, rules }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn describe_rules(&self, strings: &Strings) -> Vec<String> {
        self.rules.iter().map(|r| r.description(strings)).collect()
    }

    /// Collects the reason of every rule that blocks a new attempt. Empty means allowed.
    pub async fn prevent_new_attempt(
        &self,
        gradebook: &dyn Gradebook,
        strings: &Strings,
        num_prev_attempts: i64,
        last_attempt: Option<&AttemptRecord>,
    ) -> Result<Vec<String>, AppError> {
        let mut reasons = Vec::new();
        for rule in &self.rules {
            if let Some(reason) = rule
                .prevent_new_attempt(gradebook, strings, num_prev_attempts, last_attempt)
                .await?
            {
                reasons.push(reason);
            }
        }
        Ok(reasons)
    }

    pub fn add_settings_form_fields(form: &mut SettingsForm, strings: &Strings) {
        FailGradeRule::add_settings_form_fields(form, strings);
    }

    pub async fn save_settings<'e, E>(executor: E, quiz: &Quiz) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        FailGradeRule::save_settings(executor, quiz).await
    }

    pub async fn delete_settings(pool: &SqlitePool, quiz_id: i64) -> Result<(), AppError> {
        FailGradeRule::delete_settings(pool, quiz_id).await
    }

    /// Combined fragments of every rule.
    pub fn settings_sql(quiz_id: i64) -> SettingsSql {
        SettingsSql::default().merge(FailGradeRule::get_settings_sql(quiz_id))
    }

    /// Loads one quiz together with every rule's settings in a single query.
    pub async fn load_quiz_settings<'e, E>(executor: E, quiz_id: i64) -> Result<Option<Quiz>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let parts = Self::settings_sql(quiz_id);
        let sql = format!(
            "SELECT quiz.id, quiz.course, quiz.name, quiz.grademethod, {} FROM quizzes quiz {} WHERE quiz.id = ?",
            parts.fields.join(", "),
            parts.joins.join(" "),
        );

        let mut query = sqlx::query_as::<Sqlite, QuizRow>(&sql);
        for param in &parts.params {
            query = query.bind(*param);
        }

        let row = query.bind(quiz_id).fetch_optional(executor).await.map_err(|e| {
            tracing::error!("Failed to load settings for quiz {}: {:?}", quiz_id, e);
            AppError::InternalServerError(e.to_string())
        })?;

        row.map(Quiz::try_from)
            .transpose()
            .map_err(AppError::InternalServerError)
    }

    /// Lists every quiz with its rule settings, without one query per quiz.
    pub async fn list_quizzes_with_settings(pool: &SqlitePool) -> Result<Vec<Quiz>, AppError> {
        // Fragments do not depend on the quiz id, so any id serves for the list query.
        let parts = Self::settings_sql(0);
        let sql = format!(
            "SELECT quiz.id, quiz.course, quiz.name, quiz.grademethod, {} FROM quizzes quiz {} ORDER BY quiz.id",
            parts.fields.join(", "),
            parts.joins.join(" "),
        );

        let mut query = sqlx::query_as::<Sqlite, QuizRow>(&sql);
        for param in &parts.params {
            query = query.bind(*param);
        }

        let rows = query.fetch_all(pool).await.map_err(|e| {
            tracing::error!("Failed to list quizzes: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        rows.into_iter()
            .map(|row| Quiz::try_from(row).map_err(AppError::InternalServerError))
            .collect()
    }
}
