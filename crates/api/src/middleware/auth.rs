//! Identity extraction from the `Authorization: Bearer` header.

use academy_core::error::CoreError;
use academy_core::roles::ROLE_ADMIN;
use academy_core::types::DbId;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::state::AppState;

/// The learner or administrator a request acts for.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: DbId,
    pub role: String,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.to_string()))
}

/// Token part of a bearer header value. The scheme is case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;
        let token =
            bearer_token(header).ok_or_else(|| unauthorized("Expected a Bearer token"))?;

        let claims = verify_token(token, &state.config.jwt).map_err(|err| {
            tracing::debug!(error = %err, "Rejected identity token");
            unauthorized("Invalid or expired token")
        })?;

        Ok(Principal {
            id: claims.sub,
            role: claims.role,
        })
    }
}
