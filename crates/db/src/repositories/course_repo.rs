//! Repository for the `courses` table.

use academy_core::resolver::CourseIdentity;
use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CreateCourse, UpdateCourse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, duration, thumbnail, category, level, \
                       status, course_type, created_at, updated_at";

/// Provides CRUD operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCourse) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses
                (title, description, duration, thumbnail, category, level, status, course_type)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'draft'), COALESCE($8, 'normal'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.duration)
            .bind(&input.thumbnail)
            .bind(&input.category)
            .bind(&input.level)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.course_type.map(|t| t.as_str()))
            .fetch_one(pool)
            .await
    }

    /// Find a course by its row key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Return `id` if a course with that row key exists.
    pub async fn find_row_key(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all courses ordered by row key.
    pub async fn list(pool: &PgPool) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses ORDER BY id ASC");
        sqlx::query_as::<_, Course>(&query).fetch_all(pool).await
    }

    /// Identity fields of every course, ordered by row key, for title matching.
    pub async fn list_identities(pool: &PgPool) -> Result<Vec<CourseIdentity>, sqlx::Error> {
        let rows: Vec<(DbId, String, Option<String>, Option<String>)> =
            sqlx::query_as("SELECT id, title, category, level FROM courses ORDER BY id ASC")
                .fetch_all(pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(id, title, category, level)| CourseIdentity {
                id,
                title,
                category,
                level,
            })
            .collect())
    }

    /// Update a course. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                duration = COALESCE($4, duration),
                thumbnail = COALESCE($5, thumbnail),
                category = COALESCE($6, category),
                level = COALESCE($7, level),
                status = COALESCE($8, status),
                course_type = COALESCE($9, course_type)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.duration)
            .bind(&input.thumbnail)
            .bind(&input.category)
            .bind(&input.level)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.course_type.map(|t| t.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a course and, by cascade, its modules.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
