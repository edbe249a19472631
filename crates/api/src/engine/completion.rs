//! `mark_complete` and `course_progress` over the repositories.

use std::collections::HashSet;

use academy_core::error::CoreError;
use academy_core::progress::{lock_state, progress_percentage, ModuleLockState};
use academy_core::types::DbId;
use academy_db::models::progress::ProgressSummary;
use academy_db::repositories::{CompletionRepo, ModuleRepo, ProgressRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Lock state of every module of a course for one learner.
#[derive(Debug, Clone, Serialize)]
pub struct CourseProgress {
    pub course_id: DbId,
    pub percentage: i16,
    pub modules: Vec<ModuleLockState>,
}

/// Record that `learner_id` finished `module_id` and return the refreshed
/// progress summary of the module's course.
///
/// Idempotent: completing a module twice only refreshes its timestamp.
pub async fn mark_complete(
    pool: &PgPool,
    learner_id: DbId,
    module_id: DbId,
) -> AppResult<ProgressSummary> {
    let module = ModuleRepo::find_by_id(pool, module_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Module",
            id: module_id,
        }))?;

    CompletionRepo::upsert(pool, learner_id, module_id).await?;
    let summary = recompute_progress(pool, learner_id, module.course_id).await?;

    tracing::info!(
        learner_id,
        module_id,
        course_id = module.course_id,
        percentage = summary.percentage,
        "Module completion recorded",
    );
    Ok(summary)
}

/// Recompute and store one learner's percentage for a course.
pub async fn recompute_progress(
    pool: &PgPool,
    learner_id: DbId,
    course_id: DbId,
) -> Result<ProgressSummary, sqlx::Error> {
    let (completed, total) = CompletionRepo::counts(pool, learner_id, course_id).await?;
    let percentage = progress_percentage(completed.max(0) as usize, total.max(0) as usize);
    ProgressRepo::upsert(pool, learner_id, course_id, percentage).await
}

/// Evaluate which modules of `course_id` are locked for `learner_id`.
pub async fn course_progress(
    pool: &PgPool,
    learner_id: DbId,
    course_id: DbId,
) -> Result<CourseProgress, sqlx::Error> {
    let modules = ModuleRepo::list_orders(pool, course_id).await?;
    let completed: HashSet<DbId> = CompletionRepo::completed_module_ids(pool, learner_id, course_id)
        .await?
        .into_iter()
        .collect();

    let states = lock_state(&modules, &completed);
    let done = states.iter().filter(|s| s.completed).count();

    Ok(CourseProgress {
        course_id,
        percentage: progress_percentage(done, states.len()),
        modules: states,
    })
}
