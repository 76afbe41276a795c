// src/models/grade.rs

use serde::Serialize;
use sqlx::FromRow;

/// Item type of grade items that belong to an activity module.
pub const ITEM_TYPE_MOD: &str = "mod";

/// Module name of quiz activities.
pub const ITEM_MODULE_QUIZ: &str = "quiz";

/// Represents the 'grade_items' table: the gradable slot of one activity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GradeItem {
    pub id: i64,
    pub courseid: i64,
    pub itemtype: String,
    pub itemmodule: Option<String>,
    pub iteminstance: Option<i64>,
    pub outcomeid: Option<i64>,
    pub grademin: f64,
    pub grademax: f64,

    /// Minimum final grade counted as passing. Equal to `grademin` when no pass grade is configured.
    pub gradepass: f64,
}

impl GradeItem {
    /// True when the item carries a usable pass threshold.
    /// A pass grade of 0 still counts when the scale starts below 0.
    pub fn has_pass_grade(&self) -> bool {
        self.gradepass != self.grademin
    }
}

/// Represents the 'grade_grades' table: one learner's grade for one item.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GradeGrade {
    pub id: i64,
    pub itemid: i64,
    pub userid: i64,
    pub finalgrade: Option<f64>,
}

impl GradeGrade {
    /// Evaluates this grade against `item`'s pass threshold.
    ///
    /// Returns `None` when passing is undefined: the item has no pass grade,
    /// or the learner has no final grade yet.
    pub fn is_passed(&self, item: &GradeItem) -> Option<bool> {
        if !item.has_pass_grade() {
            return None;
        }

        self.finalgrade.map(|grade| grade >= item.gradepass)
    }
}

/// Filter used to locate a grade item.
/// `outcome_id: None` only matches items whose outcome id is NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeItemQuery {
    pub course_id: i64,
    pub item_type: String,
    pub item_module: String,
    pub item_instance: i64,
    pub outcome_id: Option<i64>,
}

impl GradeItemQuery {
    /// The module grade item of a quiz activity.
    pub fn for_quiz(course_id: i64, quiz_id: i64) -> Self {
        Self {
            course_id,
            item_type: ITEM_TYPE_MOD.to_string(),
            item_module: ITEM_MODULE_QUIZ.to_string(),
            item_instance: quiz_id,
            outcome_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(gradepass: f64) -> GradeItem {
        GradeItem {
            id: 1,
            courseid: 1,
            itemtype: ITEM_TYPE_MOD.to_string(),
            itemmodule: Some(ITEM_MODULE_QUIZ.to_string()),
            iteminstance: Some(1),
            outcomeid: None,
            grademin: 0.0,
            grademax: 10.0,
            gradepass,
        }
    }

    fn grade(finalgrade: Option<f64>) -> GradeGrade {
        GradeGrade {
            id: 1,
            itemid: 1,
            userid: 42,
            finalgrade,
        }
    }

    #[test]
    fn test_is_passed_at_threshold() {
        assert_eq!(grade(Some(6.0)).is_passed(&item(6.0)), Some(true));
        assert_eq!(grade(Some(9.5)).is_passed(&item(6.0)), Some(true));
    }

    #[test]
    fn test_is_passed_below_threshold() {
        assert_eq!(grade(Some(5.99)).is_passed(&item(6.0)), Some(false));
    }

    #[test]
    fn test_is_passed_without_pass_grade() {
        assert_eq!(grade(Some(10.0)).is_passed(&item(0.0)), None);

        let mut min_equals_pass = item(2.0);
        min_equals_pass.grademin = 2.0;
        assert_eq!(grade(Some(10.0)).is_passed(&min_equals_pass), None);
    }

    #[test]
    fn test_zero_pass_grade_with_negative_min() {
        let mut negative_scale = item(0.0);
        negative_scale.grademin = -5.0;

        assert!(negative_scale.has_pass_grade());
        assert_eq!(grade(Some(3.0)).is_passed(&negative_scale), Some(true));
        assert_eq!(grade(Some(0.0)).is_passed(&negative_scale), Some(true));
        assert_eq!(grade(Some(-1.0)).is_passed(&negative_scale), Some(false));
    }

    #[test]
    fn test_is_passed_without_final_grade() {
        assert_eq!(grade(None).is_passed(&item(6.0)), None);
    }

    #[test]
    fn test_query_for_quiz() {
        let q = GradeItemQuery::for_quiz(3, 7);
        assert_eq!(q.item_type, "mod");
        assert_eq!(q.item_module, "quiz");
        assert_eq!(q.item_instance, 7);
        assert_eq!(q.outcome_id, None);
    }
}
