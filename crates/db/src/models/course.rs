//! Course entity model and DTOs.

use academy_core::course::{CourseRecord, CourseStatus, CourseType};
use academy_core::resolver::{external_id_for, CourseIdentity};
use academy_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::module::Module;

/// Sparse course update. Only present fields are written.
pub use academy_core::course::CourseFieldsPatch as UpdateCourse;

/// A course row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: CourseStatus,
    #[sqlx(try_from = "String")]
    pub course_type: CourseType,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Course {
    pub fn identity(&self) -> CourseIdentity {
        CourseIdentity {
            id: self.id,
            title: self.title.clone(),
            category: self.category.clone(),
            level: self.level.clone(),
        }
    }

    /// The identifier clients use to address this course.
    pub fn external_id(&self) -> String {
        external_id_for(&self.identity())
    }

    /// Combine with the course's modules into the client-facing record.
    pub fn into_record(self, modules: Vec<Module>) -> CourseRecord {
        CourseRecord {
            id: self.id,
            title: self.title,
            description: self.description,
            duration: self.duration,
            thumbnail: self.thumbnail,
            category: self.category,
            level: self.level,
            status: self.status,
            course_type: self.course_type,
            modules: modules.into_iter().map(Module::into_record).collect(),
        }
    }
}

/// DTO for creating a new course.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    /// Defaults to `draft` if omitted.
    pub status: Option<CourseStatus>,
    /// Defaults to `normal` if omitted.
    pub course_type: Option<CourseType>,
}

impl CreateCourse {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            duration: None,
            thumbnail: None,
            category: None,
            level: None,
            status: None,
            course_type: None,
        }
    }
}
