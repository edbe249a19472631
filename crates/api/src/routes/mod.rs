pub mod course;
pub mod health;
pub mod module;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /courses                                list (auth), create (admin)
/// /courses/resolve/{external_id}          resolve to row key (auth)
/// /courses/{external_id}                  get (auth), update, delete (admin)
/// /courses/{external_id}/modules          create module (admin)
/// /courses/{external_id}/progress         caller's lock state (auth)
///
/// /modules/{id}                           update, delete (admin)
/// /modules/{id}/complete                  mark complete for caller (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/courses", course::router())
        .nest("/modules", module::router())
}
