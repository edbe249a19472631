//! Repository for the `modules` table.

use academy_core::progress::ModuleOrder;
use academy_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::module::{CreateModule, Module, UpdateModule};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, course_id, title, duration, video_count, order_index, \
                       episode_date, episode_time, media_locator, client_key, \
                       created_at, updated_at";

/// Provides CRUD operations for modules.
pub struct ModuleRepo;

impl ModuleRepo {
    /// Insert a module into `course_id`.
    ///
    /// Without an explicit `order_index` the module is appended at
    /// `max(order_index) + 1` (or `0` for an empty course). When
    /// `client_key` matches an existing row, that row is returned unchanged.
    pub async fn insert(
        pool: &PgPool,
        course_id: DbId,
        input: &CreateModule,
    ) -> Result<Module, sqlx::Error> {
        let query = format!(
            "INSERT INTO modules
                (course_id, title, duration, video_count, order_index,
                 episode_date, episode_time, media_locator, client_key)
             VALUES ($1, $2, $3, $4,
                     COALESCE($5, (SELECT COALESCE(MAX(order_index) + 1, 0)
                                   FROM modules WHERE course_id = $1)),
                     $6, $7, $8, $9)
             ON CONFLICT (client_key) DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Module>(&query)
            .bind(course_id)
            .bind(&input.fields.title)
            .bind(&input.fields.duration)
            .bind(input.fields.video_count)
            .bind(input.order_index)
            .bind(input.fields.episode_date)
            .bind(input.fields.episode_time)
            .bind(&input.fields.media_locator)
            .bind(input.client_key)
            .fetch_optional(pool)
            .await?;

        match (inserted, input.client_key) {
            (Some(module), _) => Ok(module),
            (None, Some(key)) => {
                tracing::debug!(%key, course_id, "Module insert replayed, returning existing row");
                Self::find_by_client_key(pool, key)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)
            }
            (None, None) => Err(sqlx::Error::RowNotFound),
        }
    }

    /// Find a module by its row key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Module>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM modules WHERE id = $1");
        sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a module by the idempotency key it was inserted with.
    pub async fn find_by_client_key(
        pool: &PgPool,
        key: Uuid,
    ) -> Result<Option<Module>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM modules WHERE client_key = $1");
        sqlx::query_as::<_, Module>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// List a course's modules ordered by order index.
    pub async fn list_by_course(pool: &PgPool, course_id: DbId) -> Result<Vec<Module>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM modules WHERE course_id = $1 ORDER BY order_index ASC, id ASC"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// Positions of a course's modules, for the lock rule.
    pub async fn list_orders(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<ModuleOrder>, sqlx::Error> {
        let rows: Vec<(DbId, i32)> = sqlx::query_as(
            "SELECT id, order_index FROM modules WHERE course_id = $1 ORDER BY order_index ASC",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(module_id, order_index)| ModuleOrder {
                module_id,
                order_index,
            })
            .collect())
    }

    /// Update a module. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateModule,
    ) -> Result<Option<Module>, sqlx::Error> {
        let query = format!(
            "UPDATE modules SET
                title = COALESCE($2, title),
                duration = COALESCE($3, duration),
                video_count = COALESCE($4, video_count),
                episode_date = COALESCE($5, episode_date),
                episode_time = COALESCE($6, episode_time),
                media_locator = COALESCE($7, media_locator)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.duration)
            .bind(input.video_count)
            .bind(input.episode_date)
            .bind(input.episode_time)
            .bind(&input.media_locator)
            .fetch_optional(pool)
            .await
    }

    /// Delete a module by row key. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
