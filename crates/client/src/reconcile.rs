//! Draining one course's pending edits into storage.
//!
//! The steps run in a fixed order: resolve, course fields, module fields,
//! inserts, deletes. The first failing step stops the course. Nothing is
//! rolled back, so storage may be left partially updated; the caller keeps
//! the pending edits for a retry. Field overwrites and deletes are safe to
//! resend. Inserts are only safe to resend when idempotency keys are sent.

use academy_core::draft::PendingCourseEdit;
use academy_core::types::DbId;
use uuid::Uuid;

use crate::backend::{CourseBackend, ModuleInsert, ResolvedCourse};
use crate::error::{BackendError, SaveFailure, SaveStep};

/// A course whose edits were fully applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCourse {
    pub external_id: String,
    pub course_id: DbId,
    /// Row keys assigned to staged modules, by temporary key.
    pub inserted: Vec<(Uuid, DbId)>,
}

/// Apply `edit` to the course named by `external_id`.
pub async fn reconcile_course<B>(
    backend: &B,
    external_id: &str,
    edit: &PendingCourseEdit,
    idempotent_inserts: bool,
) -> Result<SavedCourse, SaveFailure>
where
    B: CourseBackend + ?Sized,
{
    let fail = |step: SaveStep| move |e: BackendError| SaveFailure::new(external_id, step, e);

    let course: ResolvedCourse = backend
        .resolve(external_id)
        .await
        .map_err(fail(SaveStep::Resolve))?;
    tracing::debug!(external_id, course_id = course.id, "Reconciling course");

    if !edit.course.is_empty() {
        backend
            .update_course(&course, &edit.course)
            .await
            .map_err(fail(SaveStep::UpdateCourse))?;
    }

    // A module staged for deletion is going away; patching it first would
    // fail on retry once the delete has gone through.
    for (&module_id, patch) in &edit.modules {
        if patch.is_empty() || edit.deleted_modules.contains(&module_id) {
            continue;
        }
        backend
            .update_module(module_id, patch)
            .await
            .map_err(fail(SaveStep::UpdateModule(module_id)))?;
    }

    let mut staged: Vec<_> = edit.new_modules.iter().collect();
    staged.sort_by_key(|m| m.order_index);
    let mut inserted = Vec::with_capacity(staged.len());
    for module in staged {
        let insert = ModuleInsert {
            fields: module.fields.clone(),
            order_index: None,
            client_key: idempotent_inserts.then_some(module.temp_key),
        };
        let id = backend
            .insert_module(&course, &insert)
            .await
            .map_err(fail(SaveStep::InsertModule(module.temp_key)))?;
        inserted.push((module.temp_key, id));
    }

    for &module_id in &edit.deleted_modules {
        match backend.delete_module(module_id).await {
            Ok(()) => {}
            Err(BackendError::NotFound(_)) => {
                tracing::debug!(external_id, module_id, "Module already deleted");
            }
            Err(e) => return Err(SaveFailure::new(external_id, SaveStep::DeleteModule(module_id), e)),
        }
    }

    Ok(SavedCourse {
        external_id: external_id.to_string(),
        course_id: course.id,
        inserted,
    })
}
