//! Module entity model and DTOs.

use academy_core::course::{ModuleKey, ModuleRecord, NewModuleFields};
use academy_core::types::{DbId, Timestamp};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Sparse module update. Only present fields are written.
pub use academy_core::course::ModuleFieldsPatch as UpdateModule;

/// A module row from the `modules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Module {
    pub id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub duration: Option<String>,
    pub video_count: i32,
    pub order_index: i32,
    pub episode_date: Option<NaiveDate>,
    pub episode_time: Option<NaiveTime>,
    pub media_locator: Option<String>,
    pub client_key: Option<Uuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Module {
    pub fn into_record(self) -> ModuleRecord {
        ModuleRecord {
            key: ModuleKey::Stored(self.id),
            title: self.title,
            duration: self.duration,
            video_count: self.video_count,
            order_index: self.order_index,
            episode_date: self.episode_date,
            episode_time: self.episode_time,
            media_locator: self.media_locator,
        }
    }
}

/// DTO for inserting a module into a course.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateModule {
    #[serde(flatten)]
    pub fields: NewModuleFields,
    /// Explicit position; `None` appends after the current last module.
    #[serde(default)]
    pub order_index: Option<i32>,
    /// Idempotency key. A replayed insert with the same key returns the
    /// existing row instead of creating another.
    #[serde(default)]
    pub client_key: Option<Uuid>,
}
