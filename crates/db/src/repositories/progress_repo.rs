//! Repository for the `progress_summaries` table.

use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::progress::ProgressSummary;

const COLUMNS: &str = "learner_id, course_id, percentage, updated_at";

/// Stores the derived per-course progress percentage of each learner.
pub struct ProgressRepo;

impl ProgressRepo {
    /// Insert or replace a learner's percentage for a course.
    pub async fn upsert(
        pool: &PgPool,
        learner_id: DbId,
        course_id: DbId,
        percentage: i16,
    ) -> Result<ProgressSummary, sqlx::Error> {
        let query = format!(
            "INSERT INTO progress_summaries (learner_id, course_id, percentage, updated_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (learner_id, course_id)
             DO UPDATE SET percentage = EXCLUDED.percentage, updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProgressSummary>(&query)
            .bind(learner_id)
            .bind(course_id)
            .bind(percentage)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        learner_id: DbId,
        course_id: DbId,
    ) -> Result<Option<ProgressSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM progress_summaries WHERE learner_id = $1 AND course_id = $2"
        );
        sqlx::query_as::<_, ProgressSummary>(&query)
            .bind(learner_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Recompute every stored summary of a course from completion facts.
    ///
    /// Called after the module set of a course changes, so summaries keep
    /// matching `round(100 * completed / total)`. Returns the number of
    /// summaries rewritten.
    pub async fn recompute_course(pool: &PgPool, course_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE progress_summaries ps SET
                percentage = COALESCE((
                    SELECT ROUND(
                        100.0 * COUNT(cf.module_id) FILTER (WHERE cf.completed)
                        / NULLIF(COUNT(m.id), 0)
                    )::SMALLINT
                    FROM modules m
                    LEFT JOIN completion_facts cf
                        ON cf.module_id = m.id AND cf.learner_id = ps.learner_id
                    WHERE m.course_id = ps.course_id
                ), 0),
                updated_at = NOW()
             WHERE ps.course_id = $1",
        )
        .bind(course_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
