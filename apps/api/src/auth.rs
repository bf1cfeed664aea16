//! JWT authentication module.
//!
//! Tokens travel in the `x-auth-token` header. A token names its holder
//! (`sub`) and whether the holder is a rider or an admin (`role`).
//!
//! ```text
//! x-auth-token ──► AuthUser   (role = user)   ──► ride, balance, history routes
//!              └─► AdminUser  (role = admin)  ──► /api/adminActions/*
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// Header carrying the token.
pub const AUTH_HEADER: &str = "x-auth-token";

/// Who a token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account id or admin id)
    pub sub: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// JWT token manager.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    /// Signs a token for `subject`. HS256, the `jsonwebtoken` default.
    pub fn issue(&self, subject: &str, role: Role) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature and expiry.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected token");
                ApiError::InvalidToken
            })
    }

    fn claims_from(&self, parts: &Parts) -> Result<Claims, ApiError> {
        let token = parts
            .headers
            .get(AUTH_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::NoToken)?;

        self.validate(token)
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// Authenticated rider. The id is trusted as-is by the ride engine.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = state.jwt.claims_from(parts)?;
        if claims.role != Role::User {
            return Err(ApiError::Forbidden);
        }
        Ok(AuthUser { user_id: claims.sub })
    }
}

/// Authenticated admin.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub admin_id: String,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = state.jwt.claims_from(parts)?;
        if claims.role != Role::Admin {
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser { admin_id: claims.sub })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_validate() {
        let jwt = JwtManager::new("secret", 60);
        let token = jwt.issue("user-1", Role::User).unwrap();

        let claims = jwt.validate(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = JwtManager::new("secret", 60).issue("user-1", Role::Admin).unwrap();
        let other = JwtManager::new("another", 60);
        assert!(matches!(other.validate(&token), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn test_expired_is_invalid() {
        // Past the default 60 second leeway.
        let jwt = JwtManager::new("secret", -600);
        let token = jwt.issue("user-1", Role::User).unwrap();
        assert!(matches!(jwt.validate(&token), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let jwt = JwtManager::new("secret", 60);
        assert!(matches!(jwt.validate("not.a.jwt"), Err(ApiError::InvalidToken)));
    }
}
