//! HS256 identity tokens.
//!
//! The identity service signs a token per learner or administrator; this
//! server only checks the signature and expiry and reads the role. There is
//! no clock leeway, so a token is rejected the second it expires.

use academy_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Payload of an identity token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IdentityClaims {
    /// Learner or administrator id. Completion facts are keyed on it.
    pub sub: DbId,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret with the identity service.
    pub secret: String,
    /// Lifetime of tokens minted by [`issue_token`].
    pub token_ttl_mins: i64,
}

const DEFAULT_TOKEN_TTL_MINS: i64 = 15;

impl JwtConfig {
    /// Read `JWT_SECRET` (required, non-empty) and `JWT_TTL_MINS`
    /// (default 15).
    ///
    /// # Panics
    ///
    /// Panics on a missing secret or a non-numeric lifetime.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let token_ttl_mins = std::env::var("JWT_TTL_MINS")
            .map(|v| v.parse().expect("JWT_TTL_MINS must be a whole number"))
            .unwrap_or(DEFAULT_TOKEN_TTL_MINS);

        Self {
            secret,
            token_ttl_mins,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation
    }
}

/// Mint a token for `principal_id`. Used by tests and local tooling.
pub fn issue_token(
    principal_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = IdentityClaims {
        sub: principal_id,
        role: role.to_string(),
        exp: iat + config.token_ttl_mins * 60,
        iat,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<IdentityClaims, jsonwebtoken::errors::Error> {
    decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &JwtConfig::validation(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use academy_core::roles::{ROLE_ADMIN, ROLE_LEARNER};

    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            token_ttl_mins: 15,
        }
    }

    fn sign(claims: &IdentityClaims, config: &JwtConfig) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_carries_learner_identity() {
        let config = config("academy-test-secret");
        let token = issue_token(42, ROLE_LEARNER, &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, ROLE_LEARNER);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn just_expired_token_is_rejected() {
        let config = config("academy-test-secret");
        let now = chrono::Utc::now().timestamp();
        let token = sign(
            &IdentityClaims {
                sub: 1,
                role: ROLE_LEARNER.to_string(),
                exp: now - 5,
                iat: now - 905,
            },
            &config,
        );

        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn token_from_another_issuer_is_rejected() {
        let token = issue_token(1, ROLE_ADMIN, &config("identity-service-a")).unwrap();
        assert!(verify_token(&token, &config("identity-service-b")).is_err());
    }

    #[test]
    fn non_hs256_token_is_rejected() {
        let config = config("academy-test-secret");
        let now = chrono::Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &IdentityClaims {
                sub: 1,
                role: ROLE_ADMIN.to_string(),
                exp: now + 60,
                iat: now,
            },
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, &config).is_err());
    }
}
