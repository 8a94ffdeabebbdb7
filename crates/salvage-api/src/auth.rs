//! Caller identity.
//!
//! Authentication happens upstream. The auth proxy verifies the session and
//! forwards the player's UUID in the `x-user-id` header; this extractor
//! only reads it. A missing or malformed header is `NotAuthenticated`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use salvage_core::Rejection;
use salvage_types::UserId;

use crate::error::ApiError;

/// Header carrying the verified player ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated player making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<UserId>().ok())
            .map(Self)
            .ok_or_else(|| Rejection::NotAuthenticated.into())
    }
}
