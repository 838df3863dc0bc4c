//! Caller identity for HTTP routes.
//!
//! The identity provider sits in front of the engine and forwards the caller
//! as `X-User-Id` and `X-User-Role` headers. Values are trusted as given.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use skirmish_domain::UserId;

use crate::api::http::ApiError;
use crate::infrastructure::ports::{Caller, UserRole};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Read the caller from request headers.
///
/// A missing or malformed user id, or an unknown role, is rejected.
/// A missing role means `player`.
pub fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, ApiError> {
    let raw_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;
    let user_id = Uuid::parse_str(raw_id.trim())
        .map(UserId::from_uuid)
        .map_err(|_| ApiError::Unauthorized("X-User-Id must be a UUID".to_string()))?;

    let role = match headers.get(USER_ROLE_HEADER) {
        None => UserRole::default(),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|s| s.parse::<UserRole>().ok())
            .ok_or_else(|| ApiError::Unauthorized("Unknown X-User-Role".to_string()))?,
    };

    Ok(Caller::new(user_id, role))
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_from_headers(&parts.headers)
    }
}
