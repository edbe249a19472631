//! Completion facts and derived progress summaries.

use academy_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `completion_facts`: one learner finished one module.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompletionFact {
    pub learner_id: DbId,
    pub module_id: DbId,
    pub completed: bool,
    pub completed_at: Timestamp,
}

/// A row from `progress_summaries`, always derived from completion facts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgressSummary {
    pub learner_id: DbId,
    pub course_id: DbId,
    pub percentage: i16,
    pub updated_at: Timestamp,
}
