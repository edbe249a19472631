#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use academy_client::backend::{CourseBackend, ModuleInsert, ResolvedCourse};
use academy_client::error::BackendError;
use academy_core::course::{
    CourseFieldsPatch, CourseRecord, CourseStatus, CourseType, ModuleFieldsPatch, ModuleKey,
    ModuleRecord,
};
use academy_core::resolver::{
    external_id_for, match_title_pattern, CourseIdentity, CourseLookup, IdentifierResolver,
    ResolveError,
};
use academy_core::types::DbId;
use async_trait::async_trait;
use tokio::sync::Notify;
use uuid::Uuid;

/// A backend call that should fail once with a 500.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailPoint {
    UpdateCourse(DbId),
    UpdateModule(DbId),
    InsertTitled(String),
    DeleteModule(DbId),
}

/// Record of a call the fake received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Resolve(String),
    UpdateCourse(DbId),
    UpdateModule(DbId),
    Insert(String),
    Delete(DbId),
}

#[derive(Default)]
pub struct FakeState {
    pub courses: BTreeMap<DbId, CourseRecord>,
    pub modules: BTreeMap<DbId, (DbId, ModuleRecord)>,
    pub client_keys: HashMap<Uuid, DbId>,
    pub fail_points: Vec<FailPoint>,
    pub calls: Vec<Call>,
    next_id: DbId,
}

impl FakeState {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn take_failure(&mut self, point: FailPoint) -> Result<(), BackendError> {
        match self.fail_points.iter().position(|p| *p == point) {
            Some(i) => {
                self.fail_points.remove(i);
                Err(BackendError::Api {
                    status: 500,
                    body: format!("injected failure at {point:?}"),
                })
            }
            None => Ok(()),
        }
    }

    fn identities(&self) -> Vec<CourseIdentity> {
        self.courses
            .values()
            .map(|c| CourseIdentity {
                id: c.id,
                title: c.title.clone(),
                category: c.category.clone(),
                level: c.level.clone(),
            })
            .collect()
    }

    pub fn modules_of(&self, course_id: DbId) -> Vec<ModuleRecord> {
        let mut modules: Vec<ModuleRecord> = self
            .modules
            .values()
            .filter(|(owner, _)| *owner == course_id)
            .map(|(_, m)| m.clone())
            .collect();
        modules.sort_by_key(|m| m.order_index);
        modules
    }
}

struct Identities(Vec<CourseIdentity>);

#[async_trait]
impl CourseLookup for Identities {
    type Error = Infallible;

    async fn find_course_row_key(&self, candidate: DbId) -> Result<Option<DbId>, Infallible> {
        Ok(self.0.iter().find(|c| c.id == candidate).map(|c| c.id))
    }

    async fn find_course_by_title_pattern(
        &self,
        normalized: &str,
    ) -> Result<Option<DbId>, Infallible> {
        Ok(match_title_pattern(&self.0, normalized))
    }
}

/// In-memory course storage speaking the [`CourseBackend`] port.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
    hold_resolve: AtomicBool,
    pub resolve_entered: Notify,
    pub resolve_release: Notify,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Add a course with the given module titles; returns its external id
    /// and module row keys.
    pub fn add_course(&self, title: &str, module_titles: &[&str]) -> (String, Vec<DbId>) {
        let mut state = self.state();
        let id = state.next_id();
        let course = CourseRecord {
            id,
            title: title.to_string(),
            description: None,
            duration: None,
            thumbnail: None,
            category: None,
            level: None,
            status: CourseStatus::Draft,
            course_type: CourseType::Normal,
            modules: Vec::new(),
        };
        let external_id = external_id_for(&CourseIdentity {
            id,
            title: course.title.clone(),
            category: None,
            level: None,
        });
        state.courses.insert(id, course);

        let mut module_ids = Vec::new();
        for (order_index, module_title) in module_titles.iter().enumerate() {
            let module_id = state.next_id();
            state.modules.insert(
                module_id,
                (id, module(module_id, module_title, order_index as i32)),
            );
            module_ids.push(module_id);
        }
        (external_id, module_ids)
    }

    pub fn fail_once(&self, point: FailPoint) {
        self.state().fail_points.push(point);
    }

    /// Park the next `resolve` call until `resolve_release` is notified,
    /// signalling `resolve_entered` once parked.
    pub fn hold_next_resolve(&self) {
        self.hold_resolve.store(true, Ordering::SeqCst);
    }

    pub fn course(&self, id: DbId) -> CourseRecord {
        self.state().courses[&id].clone()
    }

    pub fn module_titles(&self, course_id: DbId) -> Vec<String> {
        self.state()
            .modules_of(course_id)
            .into_iter()
            .map(|m| m.title)
            .collect()
    }
}

pub fn module(id: DbId, title: &str, order_index: i32) -> ModuleRecord {
    ModuleRecord {
        key: ModuleKey::Stored(id),
        title: title.to_string(),
        duration: None,
        video_count: 0,
        order_index,
        episode_date: None,
        episode_time: None,
        media_locator: None,
    }
}

#[async_trait]
impl CourseBackend for FakeBackend {
    async fn resolve(&self, external_id: &str) -> Result<ResolvedCourse, BackendError> {
        if self.hold_resolve.swap(false, Ordering::SeqCst) {
            self.resolve_entered.notify_one();
            self.resolve_release.notified().await;
        }

        let identities = {
            let mut state = self.state();
            state.calls.push(Call::Resolve(external_id.to_string()));
            state.identities()
        };
        let resolver = IdentifierResolver::new(Identities(identities.clone()));
        match resolver.resolve(external_id).await {
            Ok(id) => {
                let identity = identities.iter().find(|c| c.id == id).unwrap();
                Ok(ResolvedCourse {
                    id,
                    external_id: external_id_for(identity),
                })
            }
            Err(ResolveError::NotFound(id)) => Err(BackendError::NotFound(id)),
            Err(ResolveError::Lookup(never)) => match never {},
        }
    }

    async fn fetch_course(&self, external_id: &str) -> Result<CourseRecord, BackendError> {
        let course = self.resolve(external_id).await?;
        let state = self.state();
        let mut record = state.courses[&course.id].clone();
        record.modules = state.modules_of(course.id);
        Ok(record)
    }

    async fn update_course(
        &self,
        course: &ResolvedCourse,
        patch: &CourseFieldsPatch,
    ) -> Result<(), BackendError> {
        let mut state = self.state();
        state.calls.push(Call::UpdateCourse(course.id));
        state.take_failure(FailPoint::UpdateCourse(course.id))?;
        let record = state
            .courses
            .get_mut(&course.id)
            .ok_or_else(|| BackendError::NotFound(course.external_id.clone()))?;
        patch.apply_to(record);
        Ok(())
    }

    async fn update_module(
        &self,
        module_id: DbId,
        patch: &ModuleFieldsPatch,
    ) -> Result<(), BackendError> {
        let mut state = self.state();
        state.calls.push(Call::UpdateModule(module_id));
        state.take_failure(FailPoint::UpdateModule(module_id))?;
        let (_, record) = state
            .modules
            .get_mut(&module_id)
            .ok_or_else(|| BackendError::NotFound(format!("module {module_id}")))?;
        patch.apply_to(record);
        Ok(())
    }

    async fn insert_module(
        &self,
        course: &ResolvedCourse,
        insert: &ModuleInsert,
    ) -> Result<DbId, BackendError> {
        let mut state = self.state();
        state.calls.push(Call::Insert(insert.fields.title.clone()));
        state.take_failure(FailPoint::InsertTitled(insert.fields.title.clone()))?;

        if let Some(existing) = insert.client_key.and_then(|k| state.client_keys.get(&k)) {
            return Ok(*existing);
        }

        let order_index = insert.order_index.unwrap_or_else(|| {
            state
                .modules_of(course.id)
                .last()
                .map_or(0, |m| m.order_index + 1)
        });
        let id = state.next_id();
        let mut record = module(id, &insert.fields.title, order_index);
        record.video_count = insert.fields.video_count;
        record.duration = insert.fields.duration.clone();
        state.modules.insert(id, (course.id, record));
        if let Some(key) = insert.client_key {
            state.client_keys.insert(key, id);
        }
        Ok(id)
    }

    async fn delete_module(&self, module_id: DbId) -> Result<(), BackendError> {
        let mut state = self.state();
        state.calls.push(Call::Delete(module_id));
        state.take_failure(FailPoint::DeleteModule(module_id))?;
        state
            .modules
            .remove(&module_id)
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound(format!("module {module_id}")))
    }
}
