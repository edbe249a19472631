//! Role gates layered on [`Principal`].
//!
//! Course structure is edited by administrators only. Reading courses and
//! recording completion is open to any signed-in principal.

use academy_core::error::CoreError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::Principal;
use crate::error::AppError;
use crate::state::AppState;

pub struct RequireAdmin(pub Principal);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        if !principal.is_admin() {
            tracing::warn!(principal_id = principal.id, role = %principal.role, "Admin route refused");
            return Err(AppError::Core(CoreError::Forbidden(
                "Only administrators can edit courses".into(),
            )));
        }
        Ok(RequireAdmin(principal))
    }
}

pub struct RequireSignedIn(pub Principal);

impl FromRequestParts<AppState> for RequireSignedIn {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Principal::from_request_parts(parts, state)
            .await
            .map(RequireSignedIn)
    }
}
