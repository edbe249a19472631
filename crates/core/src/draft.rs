//! Draft change buffer: an administrator's unsaved course edits.
//!
//! Edits are recorded per external course identifier and overlaid on the
//! server record by [`DraftStore::effective_view`]. The buffer never talks
//! to storage; every mutation is mirrored through a [`DraftPersistence`]
//! port so a reload does not lose work. Repeated edits of one field simply
//! overwrite each other. There is no operation log and no undo.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::course::{
    CourseField, CourseFieldsPatch, CourseRecord, ModuleField, ModuleFieldsPatch, ModuleKey,
    ModuleRecord, NewModuleFields,
};
use crate::types::DbId;

/// All pending edits, keyed by external course identifier.
pub type DraftMap = BTreeMap<String, PendingCourseEdit>;

/// A module created in the editor but not yet inserted into storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedModule {
    /// Client-minted key. Doubles as the insert idempotency key.
    pub temp_key: Uuid,
    /// Position among the staged modules of this course (1-based).
    pub order_index: i32,
    pub fields: NewModuleFields,
}

/// Everything pending for one course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingCourseEdit {
    #[serde(default)]
    pub course: CourseFieldsPatch,
    #[serde(default)]
    pub modules: BTreeMap<DbId, ModuleFieldsPatch>,
    #[serde(default)]
    pub new_modules: Vec<StagedModule>,
    #[serde(default)]
    pub deleted_modules: BTreeSet<DbId>,
}

impl PendingCourseEdit {
    pub fn is_empty(&self) -> bool {
        self.course.is_empty()
            && self.modules.values().all(ModuleFieldsPatch::is_empty)
            && self.new_modules.is_empty()
            && self.deleted_modules.is_empty()
    }

    /// Remove what `sent` carried, keeping anything edited since it was taken.
    ///
    /// When nothing changed in between, the result is empty.
    pub fn settle(&mut self, sent: &PendingCourseEdit) {
        self.course.settle(&sent.course);

        for (id, sent_patch) in &sent.modules {
            if let Some(patch) = self.modules.get_mut(id) {
                patch.settle(sent_patch);
            }
        }
        self.modules.retain(|_, patch| !patch.is_empty());

        self.new_modules
            .retain(|staged| !sent.new_modules.iter().any(|s| s.temp_key == staged.temp_key));

        for id in &sent.deleted_modules {
            self.deleted_modules.remove(id);
        }
    }

    fn next_staged_order(&self) -> i32 {
        self.new_modules
            .iter()
            .map(|m| m.order_index)
            .max()
            .unwrap_or(0)
            + 1
    }
}

// ---------------------------------------------------------------------------
// Persistence port
// ---------------------------------------------------------------------------

/// Errors raised by a [`DraftPersistence`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Draft storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Draft storage is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable mirror of the buffer.
pub trait DraftPersistence: Send + Sync {
    /// Load the last written drafts. An absent mirror reads as empty.
    fn read(&self) -> Result<DraftMap, PersistenceError>;

    /// Replace the mirror with `drafts`.
    fn write(&self, drafts: &DraftMap) -> Result<(), PersistenceError>;

    /// Remove the mirror entirely.
    fn clear(&self) -> Result<(), PersistenceError>;
}

impl<T: DraftPersistence + ?Sized> DraftPersistence for Arc<T> {
    fn read(&self) -> Result<DraftMap, PersistenceError> {
        (**self).read()
    }

    fn write(&self, drafts: &DraftMap) -> Result<(), PersistenceError> {
        (**self).write(drafts)
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        (**self).clear()
    }
}

/// In-process persistence, for tests and sessions that opt out of durability.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    stored: Mutex<Option<String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether anything is currently mirrored.
    pub fn is_populated(&self) -> bool {
        self.stored.lock().map(|s| s.is_some()).unwrap_or(false)
    }
}

impl DraftPersistence for MemoryPersistence {
    fn read(&self) -> Result<DraftMap, PersistenceError> {
        let stored = self.stored.lock().unwrap_or_else(|p| p.into_inner());
        match stored.as_deref() {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(DraftMap::new()),
        }
    }

    fn write(&self, drafts: &DraftMap) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(drafts)?;
        *self.stored.lock().unwrap_or_else(|p| p.into_inner()) = Some(json);
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        *self.stored.lock().unwrap_or_else(|p| p.into_inner()) = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DraftStore
// ---------------------------------------------------------------------------

/// The buffer itself, backed by a persistence port.
pub struct DraftStore<P> {
    drafts: DraftMap,
    persistence: P,
}

impl<P: DraftPersistence> DraftStore<P> {
    /// Open the store, restoring whatever the persistence port holds.
    pub fn open(persistence: P) -> Result<Self, PersistenceError> {
        let mut drafts = persistence.read()?;
        drafts.retain(|_, edit| !edit.is_empty());
        Ok(Self {
            drafts,
            persistence,
        })
    }

    /// Record a course-level field edit.
    pub fn set_course_field(
        &mut self,
        external_id: &str,
        field: CourseField,
    ) -> Result<(), PersistenceError> {
        self.update(external_id, |edit| edit.course.set(field))
    }

    /// Record a module-level field edit.
    ///
    /// A staged module's fields are edited in place.
    pub fn set_module_field(
        &mut self,
        external_id: &str,
        module: ModuleKey,
        field: ModuleField,
    ) -> Result<(), PersistenceError> {
        self.update(external_id, |edit| match module {
            ModuleKey::Stored(id) => edit.modules.entry(id).or_default().set(field),
            ModuleKey::Staged(key) => {
                if let Some(staged) = edit.new_modules.iter_mut().find(|m| m.temp_key == key) {
                    staged.fields.set(field);
                }
            }
        })
    }

    /// Stage a new module and return its temporary key.
    pub fn stage_new_module(
        &mut self,
        external_id: &str,
        fields: NewModuleFields,
    ) -> Result<Uuid, PersistenceError> {
        self.update(external_id, |edit| {
            let temp_key = Uuid::new_v4();
            let order_index = edit.next_staged_order();
            edit.new_modules.push(StagedModule {
                temp_key,
                order_index,
                fields,
            });
            temp_key
        })
    }

    /// Stage a module for deletion.
    ///
    /// Field edits already recorded for a stored module stay in place.
    /// Deleting a staged module unstages it.
    pub fn stage_module_deletion(
        &mut self,
        external_id: &str,
        module: ModuleKey,
    ) -> Result<(), PersistenceError> {
        self.update(external_id, |edit| match module {
            ModuleKey::Stored(id) => {
                edit.deleted_modules.insert(id);
            }
            ModuleKey::Staged(key) => edit.new_modules.retain(|m| m.temp_key != key),
        })
    }

    /// Overlay pending edits on `server`. Pure; the store is not modified.
    ///
    /// Deleted modules are hidden and staged modules follow the stored
    /// ones in staging order.
    pub fn effective_view(&self, external_id: &str, server: &CourseRecord) -> CourseRecord {
        let mut view = server.clone();
        let Some(edit) = self.drafts.get(external_id) else {
            return view;
        };

        edit.course.apply_to(&mut view);

        view.modules.retain(|m| match m.key {
            ModuleKey::Stored(id) => !edit.deleted_modules.contains(&id),
            ModuleKey::Staged(_) => true,
        });
        for module in &mut view.modules {
            if let ModuleKey::Stored(id) = module.key {
                if let Some(patch) = edit.modules.get(&id) {
                    patch.apply_to(module);
                }
            }
        }

        let base = view
            .modules
            .iter()
            .map(|m| m.order_index)
            .max()
            .unwrap_or(-1);
        let mut staged: Vec<&StagedModule> = edit.new_modules.iter().collect();
        staged.sort_by_key(|m| m.order_index);
        view.modules.extend(staged.into_iter().map(|m| ModuleRecord {
            key: ModuleKey::Staged(m.temp_key),
            title: m.fields.title.clone(),
            duration: m.fields.duration.clone(),
            video_count: m.fields.video_count,
            order_index: base + m.order_index,
            episode_date: m.fields.episode_date,
            episode_time: m.fields.episode_time,
            media_locator: m.fields.media_locator.clone(),
        }));

        view
    }

    /// Drop all pending state for one course.
    pub fn clear(&mut self, external_id: &str) -> Result<(), PersistenceError> {
        let Some(previous) = self.drafts.remove(external_id) else {
            return Ok(());
        };
        self.flush().inspect_err(|_| {
            self.drafts.insert(external_id.to_string(), previous);
        })
    }

    /// Remove from one course's entry exactly what `sent` carried.
    pub fn settle(
        &mut self,
        external_id: &str,
        sent: &PendingCourseEdit,
    ) -> Result<(), PersistenceError> {
        if !self.drafts.contains_key(external_id) {
            return Ok(());
        }
        self.update(external_id, |edit| edit.settle(sent))
    }

    pub fn pending(&self, external_id: &str) -> Option<&PendingCourseEdit> {
        self.drafts.get(external_id)
    }

    pub fn has_pending(&self) -> bool {
        !self.drafts.is_empty()
    }

    /// Copy of every pending entry, in identifier order.
    pub fn snapshot(&self) -> Vec<(String, PendingCourseEdit)> {
        self.drafts
            .iter()
            .map(|(id, edit)| (id.clone(), edit.clone()))
            .collect()
    }

    /// Apply `change` to one course's entry and mirror the result.
    ///
    /// The entry is restored if the mirror cannot be written, so the buffer
    /// never holds an edit the persistence port does not.
    fn update<T>(
        &mut self,
        external_id: &str,
        change: impl FnOnce(&mut PendingCourseEdit) -> T,
    ) -> Result<T, PersistenceError> {
        let previous = self.drafts.get(external_id).cloned();
        let edit = self.drafts.entry(external_id.to_string()).or_default();
        let out = change(edit);
        if edit.is_empty() {
            self.drafts.remove(external_id);
        }

        match self.flush() {
            Ok(()) => Ok(out),
            Err(err) => {
                match previous {
                    Some(previous) => self.drafts.insert(external_id.to_string(), previous),
                    None => self.drafts.remove(external_id),
                };
                Err(err)
            }
        }
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        if self.drafts.is_empty() {
            self.persistence.clear()
        } else {
            self.persistence.write(&self.drafts)
        }
    }
}
