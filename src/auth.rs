use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::state::SharedState;

/// Caller holding the configured admin bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AdminToken;

impl FromRequestParts<SharedState> for AdminToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        // Without a configured token the read-back API does not exist.
        let Some(expected) = state.config.admin_token.as_deref() else {
            return Err(AppError::NotFound("Not found".to_string()));
        };

        let auth_header = parts
            .headers
            .get("authorization")
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?;
        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(AdminToken)
        } else {
            Err(AppError::Unauthorized("Invalid token".to_string()))
        }
    }
}
