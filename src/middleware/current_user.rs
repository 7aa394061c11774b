use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the authenticated user's id, set by the upstream gateway
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user a request is made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

impl CurrentUser {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let raw = headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("missing user identity".to_string()))?;

        raw.to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("malformed user identity".to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}
