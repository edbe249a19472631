//! Course and module records, their enums, and sparse patch types.
//!
//! Records are the server-side view of a course as the editing client sees
//! it. Patches carry only the fields an edit actually touched; an absent
//! field is never sent and never overwritten.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::DbId;

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $( $variant:ident = $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// All values, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Text stored in the database `TEXT` column.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} '{other}'",
                        $label
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_text_enum! {
    /// Course lifecycle status.
    CourseStatus ("course status") {
        Draft = "draft",
        Active = "active",
    }
}

define_text_enum! {
    /// Course delivery cadence. Episode dates on modules only matter for `Monthly`.
    CourseType ("course type") {
        Normal = "normal",
        Monthly = "monthly",
        Yearly = "yearly",
    }
}

impl Default for CourseStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl Default for CourseType {
    fn default() -> Self {
        Self::Normal
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Identity of a module inside a course view.
///
/// Persisted modules are addressed by row key; modules staged in the draft
/// buffer only have a client-minted temporary key until they are saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ModuleKey {
    Stored(DbId),
    Staged(Uuid),
}

/// A course with its ordered modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub status: CourseStatus,
    pub course_type: CourseType,
    pub modules: Vec<ModuleRecord>,
}

/// A module as rendered by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub key: ModuleKey,
    pub title: String,
    pub duration: Option<String>,
    pub video_count: i32,
    pub order_index: i32,
    pub episode_date: Option<NaiveDate>,
    pub episode_time: Option<NaiveTime>,
    pub media_locator: Option<String>,
}

/// Field values for a module that does not exist in storage yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewModuleFields {
    pub title: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub video_count: i32,
    #[serde(default)]
    pub episode_date: Option<NaiveDate>,
    #[serde(default)]
    pub episode_time: Option<NaiveTime>,
    #[serde(default)]
    pub media_locator: Option<String>,
}

impl NewModuleFields {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Overwrite a single field.
    pub fn set(&mut self, field: ModuleField) {
        match field {
            ModuleField::Title(v) => self.title = v,
            ModuleField::Duration(v) => self.duration = Some(v),
            ModuleField::VideoCount(v) => self.video_count = v,
            ModuleField::EpisodeDate(v) => self.episode_date = Some(v),
            ModuleField::EpisodeTime(v) => self.episode_time = Some(v),
            ModuleField::MediaLocator(v) => self.media_locator = Some(v),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Titles are required and must contain something other than whitespace.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("title must not be empty".into()));
    }
    Ok(())
}

/// Video counts cannot be negative.
pub fn validate_video_count(count: i32) -> Result<(), CoreError> {
    if count < 0 {
        return Err(CoreError::Validation(format!(
            "video_count must be >= 0, got {count}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Single-field edits
// ---------------------------------------------------------------------------

/// One course-level field with its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum CourseField {
    Title(String),
    Description(String),
    Duration(String),
    Thumbnail(String),
    Category(String),
    Level(String),
    Status(CourseStatus),
    CourseType(CourseType),
}

/// One module-level field with its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleField {
    Title(String),
    Duration(String),
    VideoCount(i32),
    EpisodeDate(NaiveDate),
    EpisodeTime(NaiveTime),
    MediaLocator(String),
}

// ---------------------------------------------------------------------------
// Sparse patches
// ---------------------------------------------------------------------------

/// Clear `slot` if it still holds exactly the value that was sent.
fn settle_field<T: PartialEq>(slot: &mut Option<T>, sent: &Option<T>) {
    if sent.is_some() && slot == sent {
        *slot = None;
    }
}

/// Course fields touched by an edit. `None` means "leave untouched".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseFieldsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CourseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_type: Option<CourseType>,
}

impl CourseFieldsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Record a field edit. A later edit of the same field replaces the earlier one.
    pub fn set(&mut self, field: CourseField) {
        match field {
            CourseField::Title(v) => self.title = Some(v),
            CourseField::Description(v) => self.description = Some(v),
            CourseField::Duration(v) => self.duration = Some(v),
            CourseField::Thumbnail(v) => self.thumbnail = Some(v),
            CourseField::Category(v) => self.category = Some(v),
            CourseField::Level(v) => self.level = Some(v),
            CourseField::Status(v) => self.status = Some(v),
            CourseField::CourseType(v) => self.course_type = Some(v),
        }
    }

    /// Overlay the present fields onto `record`.
    pub fn apply_to(&self, record: &mut CourseRecord) {
        if let Some(v) = &self.title {
            record.title = v.clone();
        }
        if let Some(v) = &self.description {
            record.description = Some(v.clone());
        }
        if let Some(v) = &self.duration {
            record.duration = Some(v.clone());
        }
        if let Some(v) = &self.thumbnail {
            record.thumbnail = Some(v.clone());
        }
        if let Some(v) = &self.category {
            record.category = Some(v.clone());
        }
        if let Some(v) = &self.level {
            record.level = Some(v.clone());
        }
        if let Some(v) = self.status {
            record.status = v;
        }
        if let Some(v) = self.course_type {
            record.course_type = v;
        }
    }

    /// Drop every field whose value is unchanged since `sent` was taken.
    pub fn settle(&mut self, sent: &CourseFieldsPatch) {
        settle_field(&mut self.title, &sent.title);
        settle_field(&mut self.description, &sent.description);
        settle_field(&mut self.duration, &sent.duration);
        settle_field(&mut self.thumbnail, &sent.thumbnail);
        settle_field(&mut self.category, &sent.category);
        settle_field(&mut self.level, &sent.level);
        settle_field(&mut self.status, &sent.status);
        settle_field(&mut self.course_type, &sent.course_type);
    }
}

/// Module fields touched by an edit. `None` means "leave untouched".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleFieldsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_locator: Option<String>,
}

impl ModuleFieldsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn set(&mut self, field: ModuleField) {
        match field {
            ModuleField::Title(v) => self.title = Some(v),
            ModuleField::Duration(v) => self.duration = Some(v),
            ModuleField::VideoCount(v) => self.video_count = Some(v),
            ModuleField::EpisodeDate(v) => self.episode_date = Some(v),
            ModuleField::EpisodeTime(v) => self.episode_time = Some(v),
            ModuleField::MediaLocator(v) => self.media_locator = Some(v),
        }
    }

    pub fn apply_to(&self, record: &mut ModuleRecord) {
        if let Some(v) = &self.title {
            record.title = v.clone();
        }
        if let Some(v) = &self.duration {
            record.duration = Some(v.clone());
        }
        if let Some(v) = self.video_count {
            record.video_count = v;
        }
        if let Some(v) = self.episode_date {
            record.episode_date = Some(v);
        }
        if let Some(v) = self.episode_time {
            record.episode_time = Some(v);
        }
        if let Some(v) = &self.media_locator {
            record.media_locator = Some(v.clone());
        }
    }

    pub fn settle(&mut self, sent: &ModuleFieldsPatch) {
        settle_field(&mut self.title, &sent.title);
        settle_field(&mut self.duration, &sent.duration);
        settle_field(&mut self.video_count, &sent.video_count);
        settle_field(&mut self.episode_date, &sent.episode_date);
        settle_field(&mut self.episode_time, &sent.episode_time);
        settle_field(&mut self.media_locator, &sent.media_locator);
    }
}
