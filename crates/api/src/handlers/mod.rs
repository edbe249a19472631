//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to repositories in `academy_db` and map errors via
//! [`AppError`](crate::error::AppError).

pub mod course;
pub mod module;
pub mod progress;

use academy_core::resolver::ResolvedVia;
use academy_core::types::DbId;

use crate::error::AppResult;
use crate::state::AppState;

/// Resolve an external course identifier to its row key.
///
/// Every handler addressing a course by external id goes through here.
pub(crate) async fn resolve_course(state: &AppState, external_id: &str) -> AppResult<DbId> {
    let (course_id, via) = state.resolver().resolve_with_path(external_id).await?;
    if via == ResolvedVia::TitlePattern {
        tracing::debug!(external_id, course_id, "Course resolved by title pattern");
    }
    Ok(course_id)
}
