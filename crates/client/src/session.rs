//! An administrator's editing session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use academy_core::course::{CourseField, CourseRecord, ModuleField, ModuleKey, NewModuleFields};
use academy_core::draft::{DraftPersistence, DraftStore, PendingCourseEdit, PersistenceError};
use uuid::Uuid;

use crate::backend::CourseBackend;
use crate::error::{BackendError, SaveError, SaveFailure, SaveStep};
use crate::reconcile::{reconcile_course, SavedCourse};

/// Outcome of one [`EditorSession::save`].
#[derive(Debug, Default)]
pub struct SaveReport {
    pub saved: Vec<SavedCourse>,
    pub failures: Vec<SaveFailure>,
}

impl SaveReport {
    /// True when every pending course was saved.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Clears the in-flight flag when a save ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Draft buffer plus the backend it is saved to.
///
/// Edits never touch the backend. [`save`](Self::save) reconciles every
/// pending course; at most one save runs at a time.
pub struct EditorSession<B, P> {
    backend: B,
    drafts: Mutex<DraftStore<P>>,
    saving: AtomicBool,
    idempotent_inserts: bool,
}

impl<B: CourseBackend, P: DraftPersistence> EditorSession<B, P> {
    /// Open a session, restoring drafts from `persistence`.
    pub fn open(backend: B, persistence: P) -> Result<Self, PersistenceError> {
        Ok(Self {
            backend,
            drafts: Mutex::new(DraftStore::open(persistence)?),
            saving: AtomicBool::new(false),
            idempotent_inserts: true,
        })
    }

    /// Whether staged modules are inserted with their temp key as an
    /// idempotency key. Without it, retrying a partly failed save can insert
    /// the same module twice.
    pub fn with_idempotent_inserts(mut self, enabled: bool) -> Self {
        self.idempotent_inserts = enabled;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn drafts(&self) -> MutexGuard<'_, DraftStore<P>> {
        self.drafts.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn set_course_field(
        &self,
        external_id: &str,
        field: CourseField,
    ) -> Result<(), PersistenceError> {
        self.drafts().set_course_field(external_id, field)
    }

    pub fn set_module_field(
        &self,
        external_id: &str,
        module: ModuleKey,
        field: ModuleField,
    ) -> Result<(), PersistenceError> {
        self.drafts().set_module_field(external_id, module, field)
    }

    pub fn stage_new_module(
        &self,
        external_id: &str,
        fields: NewModuleFields,
    ) -> Result<Uuid, PersistenceError> {
        self.drafts().stage_new_module(external_id, fields)
    }

    pub fn stage_module_deletion(
        &self,
        external_id: &str,
        module: ModuleKey,
    ) -> Result<(), PersistenceError> {
        self.drafts().stage_module_deletion(external_id, module)
    }

    /// Discard one course's pending edits without saving them.
    pub fn discard(&self, external_id: &str) -> Result<(), PersistenceError> {
        self.drafts().clear(external_id)
    }

    pub fn pending(&self, external_id: &str) -> Option<PendingCourseEdit> {
        self.drafts().pending(external_id).cloned()
    }

    pub fn has_pending(&self) -> bool {
        self.drafts().has_pending()
    }

    pub fn effective_view(&self, external_id: &str, server: &CourseRecord) -> CourseRecord {
        self.drafts().effective_view(external_id, server)
    }

    /// Fetch the server record and overlay this session's edits.
    pub async fn load_view(&self, external_id: &str) -> Result<CourseRecord, BackendError> {
        let server = self.backend.fetch_course(external_id).await?;
        Ok(self.effective_view(external_id, &server))
    }

    /// Reconcile every pending course with the backend.
    ///
    /// A failing course is reported in the [`SaveReport`] and keeps its
    /// edits; the remaining courses are still processed. Edits recorded
    /// while the save is running are kept for the next save.
    pub async fn save(&self) -> Result<SaveReport, SaveError> {
        let Some(_in_flight) = InFlight::acquire(&self.saving) else {
            tracing::warn!("Save rejected, another save is in progress");
            return Err(SaveError::ConcurrentSaveRejected);
        };

        let pending = self.drafts().snapshot();
        tracing::info!(courses = pending.len(), "Saving drafts");

        let mut report = SaveReport::default();
        for (external_id, edit) in pending {
            match reconcile_course(&self.backend, &external_id, &edit, self.idempotent_inserts)
                .await
            {
                Ok(saved) => {
                    if let Err(e) = self.drafts().settle(&external_id, &edit) {
                        tracing::error!(external_id, error = %e, "Saved course but could not persist drafts");
                        report
                            .failures
                            .push(SaveFailure::new(&external_id, SaveStep::Persist, e));
                        continue;
                    }
                    tracing::info!(
                        external_id,
                        course_id = saved.course_id,
                        inserted = saved.inserted.len(),
                        "Course saved",
                    );
                    report.saved.push(saved);
                }
                Err(failure) => {
                    tracing::warn!(
                        external_id,
                        step = %failure.step,
                        error = %failure.cause,
                        "Course save failed, edits kept",
                    );
                    report.failures.push(failure);
                }
            }
        }
        Ok(report)
    }
}
