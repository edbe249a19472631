//! Route definitions for the `/modules` resource.

use axum::routing::{patch, post};
use axum::Router;

use crate::handlers::{module, progress};
use crate::state::AppState;

/// Routes mounted at `/modules`.
///
/// ```text
/// PATCH  /{id}            -> update
/// DELETE /{id}            -> delete
/// POST   /{id}/complete   -> complete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", patch(module::update).delete(module::delete))
        .route("/{id}/complete", post(progress::complete))
}
