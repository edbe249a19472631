//! Storage port used by reconciliation.

use academy_core::course::{CourseFieldsPatch, CourseRecord, ModuleFieldsPatch, NewModuleFields};
use academy_core::types::DbId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BackendError;

/// A course identifier after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolvedCourse {
    pub id: DbId,
    /// Canonical identifier, always carrying `id` as its suffix.
    pub external_id: String,
}

/// Body of a module insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleInsert {
    #[serde(flatten)]
    pub fields: NewModuleFields,
    /// `None` lets storage append after the last module.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
    /// Idempotency key. A replay with the same key returns the first row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key: Option<Uuid>,
}

/// The calls one course's reconciliation needs.
#[async_trait]
pub trait CourseBackend: Send + Sync {
    /// Map an external identifier to its course.
    /// [`BackendError::NotFound`] when nothing matches.
    async fn resolve(&self, external_id: &str) -> Result<ResolvedCourse, BackendError>;

    /// The server's current record, for overlaying drafts.
    async fn fetch_course(&self, external_id: &str) -> Result<CourseRecord, BackendError>;

    /// Sparse course update; absent fields are left untouched.
    async fn update_course(
        &self,
        course: &ResolvedCourse,
        patch: &CourseFieldsPatch,
    ) -> Result<(), BackendError>;

    /// Sparse module update keyed by row key.
    async fn update_module(
        &self,
        module_id: DbId,
        patch: &ModuleFieldsPatch,
    ) -> Result<(), BackendError>;

    /// Insert a module into `course` and return its row key.
    async fn insert_module(
        &self,
        course: &ResolvedCourse,
        module: &ModuleInsert,
    ) -> Result<DbId, BackendError>;

    async fn delete_module(&self, module_id: DbId) -> Result<(), BackendError>;
}
