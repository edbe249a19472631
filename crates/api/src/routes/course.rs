//! Route definitions for the `/courses` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{course, progress};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /                           -> list
/// POST   /                           -> create
/// GET    /resolve/{external_id}      -> resolve
/// GET    /{external_id}              -> get_by_external_id
/// PATCH  /{external_id}              -> update
/// DELETE /{external_id}              -> delete
/// POST   /{external_id}/modules      -> create_module
/// GET    /{external_id}/progress     -> course_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(course::list).post(course::create))
        .route("/resolve/{external_id}", get(course::resolve))
        .route(
            "/{external_id}",
            get(course::get_by_external_id)
                .patch(course::update)
                .delete(course::delete),
        )
        .route("/{external_id}/modules", post(course::create_module))
        .route("/{external_id}/progress", get(progress::course_progress))
}
