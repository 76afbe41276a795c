// src/rules/fail_grade.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    error::AppError,
    forms::{Condition, SettingsForm},
    grading::Gradebook,
    lang::{COMPONENT, Strings},
    models::{
        attempt::AttemptRecord,
        grade::GradeItemQuery,
        quiz::{GradeMethod, Quiz},
    },
    rules::{AccessRule, SettingsSql},
};

/// Form field and column holding the rule's switch.
pub const FIELD: &str = "failgradeenabled";

/// Table storing one row per quiz with the rule enabled.
pub const TABLE: &str = "quizaccess_failgrade";

/// Blocks new attempts once the learner's quiz grade reaches the pass grade.
#[derive(Debug, Clone)]
pub struct FailGradeRule {
    quiz: Quiz,
}

impl FailGradeRule {
    /// Returns the rule for `quiz`, or `None` when it is switched off.
    pub fn make(quiz: &Quiz, _time_now: DateTime<Utc>, _can_ignore_time_limits: bool) -> Option<Self> {
        if !quiz.failgradeenabled {
            return None;
        }

        Some(Self { quiz: quiz.clone() })
    }

    /// Whether the learner behind `last_attempt` already has a passing grade.
    ///
    /// Any missing piece (no previous attempt, no grade item, no grade, no
    /// pass grade) counts as not finished.
    pub async fn is_finished(
        &self,
        gradebook: &dyn Gradebook,
        _num_prev_attempts: i64,
        last_attempt: Option<&AttemptRecord>,
    ) -> Result<bool, AppError> {
        let Some(last_attempt) = last_attempt else {
            return Ok(false);
        };

        let query = GradeItemQuery::for_quiz(self.quiz.course, self.quiz.id);
        let Some(item) = gradebook.fetch_grade_item(&query).await? else {
            return Ok(false);
        };

        let grades = gradebook
            .fetch_users_grades(&item, &[last_attempt.userid])
            .await?;

        Ok(grades
            .get(&last_attempt.userid)
            .and_then(|grade| grade.is_passed(&item))
            .unwrap_or(false))
    }

    /// Adds the yes/no switch, greyed out while grading by average.
    pub fn add_settings_form_fields(form: &mut SettingsForm, strings: &Strings) {
        form.add_select_yes_no(FIELD, strings.get_string("failgradeenabled", COMPONENT));
        form.disabled_if(FIELD, "grademethod", Condition::Eq, GradeMethod::Average.as_i64());
        form.add_help_button(FIELD, "failgradeenabled", COMPONENT, strings);
    }

    /// Persists the switch for `quiz`.
    ///
    /// The row only exists while the switch is on and the quiz is not graded by average.
    /// Takes any executor so the caller can run it inside its own transaction.
    pub async fn save_settings<'e, E>(executor: E, quiz: &Quiz) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        if !quiz.failgradeenabled || quiz.grademethod == GradeMethod::Average {
            sqlx::query("DELETE FROM quizaccess_failgrade WHERE quizid = ?")
                .bind(quiz.id)
                .execute(executor)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to clear pass-grade rule for quiz {}: {:?}", quiz.id, e);
                    AppError::InternalServerError(e.to_string())
                })?;
            tracing::debug!("Pass-grade rule disabled for quiz {}", quiz.id);
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO quizaccess_failgrade (quizid, failgradeenabled)
            VALUES (?, 1)
            ON CONFLICT(quizid) DO UPDATE SET failgradeenabled = 1
            "#,
        )
        .bind(quiz.id)
        .execute(executor)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert pass-grade rule for quiz {}: {:?}", quiz.id, e);
            AppError::InternalServerError(e.to_string())
        })?;
        tracing::debug!("Pass-grade rule enabled for quiz {}", quiz.id);

        Ok(())
    }

    pub async fn delete_settings(pool: &SqlitePool, quiz_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM quizaccess_failgrade WHERE quizid = ?")
            .bind(quiz_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Fragments the quiz loader uses to fetch the switch alongside the quiz.
    pub fn get_settings_sql(_quiz_id: i64) -> SettingsSql {
        SettingsSql {
            fields: vec![format!("COALESCE(failgrade.{FIELD}, 0) AS {FIELD}")],
            joins: vec![format!("LEFT JOIN {TABLE} failgrade ON failgrade.quizid = quiz.id")],
            params: Vec::new(),
        }
    }
}

#[async_trait]
impl AccessRule for FailGradeRule {
    fn description(&self, strings: &Strings) -> String {
        strings.get_string("failgradedescription", COMPONENT)
    }

    async fn prevent_new_attempt(
        &self,
        gradebook: &dyn Gradebook,
        strings: &Strings,
        num_prev_attempts: i64,
        last_attempt: Option<&AttemptRecord>,
    ) -> Result<Option<String>, AppError> {
        if self
            .is_finished(gradebook, num_prev_attempts, last_attempt)
            .await?
        {
            tracing::debug!(
                "Quiz {}: blocking new attempt, learner already passed",
                self.quiz.id
            );
            return Ok(Some(strings.get_string("preventmoreattempts", COMPONENT)));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::models::grade::{GradeGrade, GradeItem};

    /// In-memory gradebook holding at most one item.
    #[derive(Default)]
    struct FakeGradebook {
        item: Option<GradeItem>,
        grades: HashMap<i64, GradeGrade>,
        item_lookups: AtomicUsize,
    }

    impl FakeGradebook {
        fn with_item(gradepass: f64) -> Self {
            Self {
                item: Some(GradeItem {
                    id: 11,
                    courseid: 2,
                    itemtype: "mod".to_string(),
                    itemmodule: Some("quiz".to_string()),
                    iteminstance: Some(5),
                    outcomeid: None,
                    grademin: 0.0,
                    grademax: 10.0,
                    gradepass,
                }),
                ..Default::default()
            }
        }

        fn grade(mut self, userid: i64, finalgrade: f64) -> Self {
            self.grades.insert(
                userid,
                GradeGrade {
                    id: userid,
                    itemid: 11,
                    userid,
                    finalgrade: Some(finalgrade),
                },
            );
            self
        }
    }

    #[async_trait]
    impl Gradebook for FakeGradebook {
        async fn fetch_grade_item(&self, query: &GradeItemQuery) -> Result<Option<GradeItem>, AppError> {
            self.item_lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.item.clone().filter(|item| {
                item.courseid == query.course_id
                    && item.iteminstance == Some(query.item_instance)
                    && item.outcomeid == query.outcome_id
            }))
        }

        async fn fetch_users_grades(
            &self,
            _item: &GradeItem,
            user_ids: &[i64],
        ) -> Result<HashMap<i64, GradeGrade>, AppError> {
            Ok(self
                .grades
                .iter()
                .filter(|(id, _)| user_ids.contains(id))
                .map(|(id, g)| (*id, g.clone()))
                .collect())
        }
    }

    fn quiz(enabled: bool) -> Quiz {
        Quiz {
            id: 5,
            course: 2,
            name: "Final exam".to_string(),
            grademethod: GradeMethod::Highest,
            failgradeenabled: enabled,
        }
    }

    fn attempt(userid: i64) -> AttemptRecord {
        AttemptRecord {
            id: 1,
            quiz: 5,
            userid,
            attempt: 1,
            state: "finished".to_string(),
        }
    }

    fn rule() -> FailGradeRule {
        FailGradeRule::make(&quiz(true), Utc::now(), false).unwrap()
    }

    #[test]
    fn test_make_skips_disabled_quiz() {
        assert!(FailGradeRule::make(&quiz(false), Utc::now(), false).is_none());
        assert!(FailGradeRule::make(&quiz(true), Utc::now(), true).is_some());
    }

    #[test]
    fn test_description() {
        let strings = Strings::default();
        assert_eq!(
            rule().description(&strings),
            strings.get_string("failgradedescription", COMPONENT)
        );
    }

    #[tokio::test]
    async fn test_first_attempt_is_permitted_without_lookup() {
        let gradebook = FakeGradebook::with_item(5.0).grade(42, 10.0);
        let result = rule()
            .prevent_new_attempt(&gradebook, &Strings::default(), 0, None)
            .await
            .unwrap();

        assert_eq!(result, None);
        assert_eq!(gradebook.item_lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_grade_item_is_permitted() {
        let gradebook = FakeGradebook::default();
        let result = rule()
            .prevent_new_attempt(&gradebook, &Strings::default(), 1, Some(&attempt(42)))
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_no_grade_record_is_permitted() {
        let gradebook = FakeGradebook::with_item(5.0).grade(7, 10.0);
        let result = rule()
            .prevent_new_attempt(&gradebook, &Strings::default(), 1, Some(&attempt(42)))
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_passed_is_blocked() {
        let strings = Strings::default();
        let gradebook = FakeGradebook::with_item(5.0).grade(42, 5.0);
        let result = rule()
            .prevent_new_attempt(&gradebook, &strings, 1, Some(&attempt(42)))
            .await
            .unwrap();
        assert_eq!(
            result,
            Some(strings.get_string("preventmoreattempts", COMPONENT))
        );
    }

    #[tokio::test]
    async fn test_failed_is_permitted() {
        let gradebook = FakeGradebook::with_item(5.0).grade(42, 4.9);
        let result = rule()
            .prevent_new_attempt(&gradebook, &Strings::default(), 3, Some(&attempt(42)))
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_item_without_pass_grade_is_permitted() {
        let gradebook = FakeGradebook::with_item(0.0).grade(42, 10.0);
        let finished = rule()
            .is_finished(&gradebook, 1, Some(&attempt(42)))
            .await
            .unwrap();
        assert!(!finished);
    }

    #[test]
    fn test_settings_form_fields() {
        let strings = Strings::default();
        let mut form = SettingsForm::new();
        FailGradeRule::add_settings_form_fields(&mut form, &strings);

        let element = form.element(FIELD).unwrap();
        assert_eq!(element.label, strings.get_string("failgradeenabled", COMPONENT));
        assert!(form.is_disabled(FIELD, |name| (name == "grademethod").then_some(2)));
        assert!(!form.is_disabled(FIELD, |name| (name == "grademethod").then_some(1)));
        assert_eq!(form.help_buttons.len(), 1);
        assert_eq!(form.help_buttons[0].field, FIELD);
    }

    #[test]
    fn test_settings_sql() {
        let sql = FailGradeRule::get_settings_sql(5);
        assert_eq!(sql.fields, vec!["COALESCE(failgrade.failgradeenabled, 0) AS failgradeenabled"]);
        assert_eq!(
            sql.joins,
            vec!["LEFT JOIN quizaccess_failgrade failgrade ON failgrade.quizid = quiz.id"]
        );
        assert!(sql.params.is_empty());
    }
}
