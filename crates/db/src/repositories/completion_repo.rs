//! Repository for the `completion_facts` table.

use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::progress::CompletionFact;

const COLUMNS: &str = "learner_id, module_id, completed, completed_at";

/// Records which modules each learner has finished.
pub struct CompletionRepo;

impl CompletionRepo {
    /// Mark a module completed for a learner, refreshing the timestamp if the
    /// fact already exists.
    pub async fn upsert(
        pool: &PgPool,
        learner_id: DbId,
        module_id: DbId,
    ) -> Result<CompletionFact, sqlx::Error> {
        let query = format!(
            "INSERT INTO completion_facts (learner_id, module_id, completed, completed_at)
             VALUES ($1, $2, TRUE, NOW())
             ON CONFLICT (learner_id, module_id)
             DO UPDATE SET completed = TRUE, completed_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CompletionFact>(&query)
            .bind(learner_id)
            .bind(module_id)
            .fetch_one(pool)
            .await
    }

    /// Row keys of the modules of `course_id` the learner has completed.
    pub async fn completed_module_ids(
        pool: &PgPool,
        learner_id: DbId,
        course_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT cf.module_id
             FROM completion_facts cf
             JOIN modules m ON m.id = cf.module_id
             WHERE cf.learner_id = $1 AND m.course_id = $2 AND cf.completed",
        )
        .bind(learner_id)
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// Completed and total module counts of a course for one learner.
    pub async fn counts(
        pool: &PgPool,
        learner_id: DbId,
        course_id: DbId,
    ) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as(
            "SELECT
                COUNT(cf.module_id) FILTER (WHERE cf.completed),
                COUNT(m.id)
             FROM modules m
             LEFT JOIN completion_facts cf
                ON cf.module_id = m.id AND cf.learner_id = $1
             WHERE m.course_id = $2",
        )
        .bind(learner_id)
        .bind(course_id)
        .fetch_one(pool)
        .await
    }
}
