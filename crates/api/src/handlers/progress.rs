//! Learner-facing completion and lock-state handlers.
//!
//! The learner id is always the caller's principal id.

use academy_core::types::DbId;
use academy_db::models::progress::ProgressSummary;
use axum::extract::{Path, State};
use axum::Json;

use super::resolve_course;
use crate::engine::completion::{self, CourseProgress};
use crate::error::AppResult;
use crate::middleware::rbac::RequireSignedIn;
use crate::state::AppState;

/// POST /api/v1/modules/{id}/complete
pub async fn complete(
    RequireSignedIn(user): RequireSignedIn,
    State(state): State<AppState>,
    Path(module_id): Path<DbId>,
) -> AppResult<Json<ProgressSummary>> {
    let summary = completion::mark_complete(&state.pool, user.id, module_id).await?;
    Ok(Json(summary))
}

/// GET /api/v1/courses/{external_id}/progress
pub async fn course_progress(
    RequireSignedIn(user): RequireSignedIn,
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> AppResult<Json<CourseProgress>> {
    let course_id = resolve_course(&state, &external_id).await?;
    let progress = completion::course_progress(&state.pool, user.id, course_id).await?;
    Ok(Json(progress))
}
