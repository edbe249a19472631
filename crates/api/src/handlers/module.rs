//! Handlers for the `/modules` resource.

use academy_core::course::{validate_title, validate_video_count};
use academy_core::error::CoreError;
use academy_core::types::DbId;
use academy_db::models::module::{CreateModule, Module, UpdateModule};
use academy_db::repositories::{ModuleRepo, ProgressRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Reject blank titles and negative video counts on insert.
pub(crate) fn validate_new_module(input: &CreateModule) -> Result<(), CoreError> {
    validate_title(&input.fields.title)?;
    validate_video_count(input.fields.video_count)
}

fn validate_patch(input: &UpdateModule) -> Result<(), CoreError> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(count) = input.video_count {
        validate_video_count(count)?;
    }
    Ok(())
}

/// PATCH /api/v1/modules/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateModule>,
) -> AppResult<Json<Module>> {
    validate_patch(&input)?;
    let module = ModuleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Module",
            id,
        }))?;
    Ok(Json(module))
}

/// DELETE /api/v1/modules/{id}
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let module = ModuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Module",
            id,
        }))?;

    if !ModuleRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Module",
            id,
        }));
    }
    ProgressRepo::recompute_course(&state.pool, module.course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
