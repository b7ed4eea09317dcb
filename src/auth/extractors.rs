use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::AppError;

pub const TOKEN_HEADER: &str = "x-auth-token";

/// Verifies the `x-auth-token` header and yields the caller's user id.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Only an absent header counts as "no token"; a present but unusable
        // value is an invalid token.
        let raw = parts
            .headers
            .get(TOKEN_HEADER)
            .ok_or(AppError::Unauthenticated("No token, request denied"))?;
        let token = raw
            .to_str()
            .ok()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                warn!("unreadable or blank token header");
                AppError::Unauthenticated("Token not valid")
            })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::Unauthenticated("Token not valid")
        })?;

        Ok(AuthUser(claims.user.id))
    }
}
