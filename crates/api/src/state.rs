use std::sync::Arc;

use academy_core::resolver::IdentifierResolver;
use academy_db::PgCourseLookup;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: academy_db::DbPool,
    /// Server configuration (JWT secret, timeouts).
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(pool: academy_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    /// The identifier resolver every external-id path goes through.
    pub fn resolver(&self) -> IdentifierResolver<PgCourseLookup> {
        IdentifierResolver::new(PgCourseLookup::new(self.pool.clone()))
    }
}
