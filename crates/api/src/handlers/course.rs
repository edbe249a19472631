//! Handlers for the `/courses` resource.
//!
//! Courses are addressed by external identifier; see [`super::resolve_course`].

use academy_core::course::{validate_title, CourseRecord};
use academy_core::error::CoreError;
use academy_core::types::DbId;
use academy_db::models::course::{Course, CreateCourse, UpdateCourse};
use academy_db::models::module::{CreateModule, Module};
use academy_db::repositories::{CourseRepo, ModuleRepo, ProgressRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::resolve_course;
use crate::error::{AppError, AppResult};
use crate::handlers::module::validate_new_module;
use crate::middleware::rbac::{RequireAdmin, RequireSignedIn};
use crate::response::DataResponse;
use crate::state::AppState;

/// A course row together with its external identifier.
#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub external_id: String,
    #[serde(flatten)]
    pub course: Course,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            external_id: course.external_id(),
            course,
        }
    }
}

/// A course with its ordered modules.
#[derive(Debug, Serialize)]
pub struct CourseDetail {
    pub external_id: String,
    #[serde(flatten)]
    pub course: CourseRecord,
}

/// Result of resolving an external identifier.
#[derive(Debug, Serialize)]
pub struct ResolvedCourse {
    pub id: DbId,
    /// Canonical identifier for the resolved course.
    pub external_id: String,
}

async fn load_course(state: &AppState, id: DbId) -> AppResult<Course> {
    CourseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))
}

/// GET /api/v1/courses
pub async fn list(
    RequireSignedIn(_user): RequireSignedIn,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CourseResponse>>> {
    let courses = CourseRepo::list(&state.pool).await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// POST /api/v1/courses
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<CourseResponse>)> {
    validate_title(&input.title)?;
    let course = CourseRepo::create(&state.pool, &input).await?;
    tracing::info!(course_id = course.id, admin_id = admin.id, "Course created");
    Ok((StatusCode::CREATED, Json(course.into())))
}

/// GET /api/v1/courses/resolve/{external_id}
pub async fn resolve(
    RequireSignedIn(_user): RequireSignedIn,
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> AppResult<Json<DataResponse<ResolvedCourse>>> {
    let id = resolve_course(&state, &external_id).await?;
    let course = load_course(&state, id).await?;
    Ok(Json(DataResponse {
        data: ResolvedCourse {
            id,
            external_id: course.external_id(),
        },
    }))
}

/// GET /api/v1/courses/{external_id}
pub async fn get_by_external_id(
    RequireSignedIn(_user): RequireSignedIn,
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> AppResult<Json<CourseDetail>> {
    let id = resolve_course(&state, &external_id).await?;
    let course = load_course(&state, id).await?;
    let modules = ModuleRepo::list_by_course(&state.pool, id).await?;
    Ok(Json(CourseDetail {
        external_id: course.external_id(),
        course: course.into_record(modules),
    }))
}

/// PATCH /api/v1/courses/{external_id}
///
/// Sparse update: fields absent from the body are left untouched.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(external_id): Path<String>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<Json<CourseResponse>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    let id = resolve_course(&state, &external_id).await?;
    let course = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;
    Ok(Json(course.into()))
}

/// DELETE /api/v1/courses/{external_id}
///
/// Hard delete; the course's modules are removed with it.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> AppResult<StatusCode> {
    let id = resolve_course(&state, &external_id).await?;
    if CourseRepo::delete(&state.pool, id).await? {
        tracing::info!(course_id = id, admin_id = admin.id, "Course deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))
    }
}

/// POST /api/v1/courses/{external_id}/modules
///
/// Appends after the last module unless `order_index` is given. A replayed
/// `client_key` returns the module created by the first request.
pub async fn create_module(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(external_id): Path<String>,
    Json(input): Json<CreateModule>,
) -> AppResult<(StatusCode, Json<Module>)> {
    validate_new_module(&input)?;
    let course_id = resolve_course(&state, &external_id).await?;

    let module = ModuleRepo::insert(&state.pool, course_id, &input).await?;
    if module.course_id != course_id {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "client_key already used by a module of course {}",
            module.course_id
        ))));
    }

    ProgressRepo::recompute_course(&state.pool, course_id).await?;
    Ok((StatusCode::CREATED, Json(module)))
}
