//! PostgreSQL-backed [`CourseLookup`] for the identifier resolver.

use academy_core::resolver::{match_title_pattern, CourseLookup};
use academy_core::types::DbId;
use async_trait::async_trait;

use crate::repositories::CourseRepo;
use crate::DbPool;

/// Answers resolver queries from the `courses` table.
///
/// Title matching loads every course identity and normalizes titles in
/// Rust, so the same slug rules apply on both sides of the wire. Course
/// counts are small enough for a full scan.
#[derive(Debug, Clone)]
pub struct PgCourseLookup {
    pool: DbPool,
}

impl PgCourseLookup {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseLookup for PgCourseLookup {
    type Error = sqlx::Error;

    async fn find_course_row_key(&self, candidate: DbId) -> Result<Option<DbId>, sqlx::Error> {
        CourseRepo::find_row_key(&self.pool, candidate).await
    }

    async fn find_course_by_title_pattern(
        &self,
        normalized: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let identities = CourseRepo::list_identities(&self.pool).await?;
        Ok(match_title_pattern(&identities, normalized))
    }
}
