// src/grading.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    error::AppError,
    models::grade::{GradeGrade, GradeItem, GradeItemQuery},
};

/// Read-only access to the gradebook.
///
/// Grades are computed and owned elsewhere; implementations only look them up.
#[async_trait]
pub trait Gradebook: Send + Sync {
    /// Finds the grade item matching `query`, if any.
    /// When several items match, the oldest one is used.
    async fn fetch_grade_item(&self, query: &GradeItemQuery) -> Result<Option<GradeItem>, AppError>;

    /// Fetches the grades of `user_ids` for `item`, keyed by user id.
    /// Users without a grade row are left out of the map.
    async fn fetch_users_grades(
        &self,
        item: &GradeItem,
        user_ids: &[i64],
    ) -> Result<HashMap<i64, GradeGrade>, AppError>;
}

/// Gradebook backed by the `grade_items` and `grade_grades` tables.
#[derive(Clone)]
pub struct SqlGradebook {
    pool: SqlitePool,
}

impl SqlGradebook {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Gradebook for SqlGradebook {
    async fn fetch_grade_item(&self, query: &GradeItemQuery) -> Result<Option<GradeItem>, AppError> {
        // `IS` keeps NULL outcome ids comparable.
        // Two rows are enough to tell a unique match from an ambiguous one.
        let items = sqlx::query_as::<_, GradeItem>(
            r#"
            SELECT id, courseid, itemtype, itemmodule, iteminstance, outcomeid,
                   grademin, grademax, gradepass
            FROM grade_items
            WHERE courseid = ?
              AND itemtype = ?
              AND itemmodule = ?
              AND iteminstance = ?
              AND outcomeid IS ?
            ORDER BY id
            LIMIT 2
            "#,
        )
        .bind(query.course_id)
        .bind(query.item_type.as_str())
        .bind(query.item_module.as_str())
        .bind(query.item_instance)
        .bind(query.outcome_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch grade item: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        if items.len() > 1 {
            tracing::warn!(
                "Several grade items match {} {} instance {} in course {}; using item {}",
                query.item_type,
                query.item_module,
                query.item_instance,
                query.course_id,
                items[0].id
            );
        }

        Ok(items.into_iter().next())
    }

    async fn fetch_users_grades(
        &self,
        item: &GradeItem,
        user_ids: &[i64],
    ) -> Result<HashMap<i64, GradeGrade>, AppError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        // Use QueryBuilder for dynamic IN clause
        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, itemid, userid, finalgrade FROM grade_grades WHERE itemid = ",
        );
        query_builder.push_bind(item.id);
        query_builder.push(" AND userid IN (");

        let mut separated = query_builder.separated(",");
        for id in user_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let grades: Vec<GradeGrade> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch grades for item {}: {:?}", item.id, e);
                AppError::InternalServerError(e.to_string())
            })?;

        Ok(grades.into_iter().map(|g| (g.userid, g)).collect())
    }
}
