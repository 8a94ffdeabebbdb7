//! Error types for the game API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that converts
//! into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Business
//! rejections carry their player-facing message; infrastructure faults are
//! logged here and answered with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use salvage_core::{GameError, Rejection};
use salvage_types::Shortfall;
use serde::Serialize;

/// Message returned for every infrastructure fault.
const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A game operation failed or was rejected.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        Self::Game(GameError::Rejected(rejection))
    }
}

/// JSON body of every failed request.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shortfalls: Option<Vec<Shortfall>>,
}

const fn rejection_status(rejection: &Rejection) -> StatusCode {
    match rejection {
        Rejection::NotAuthenticated => StatusCode::UNAUTHORIZED,
        Rejection::NotFound { .. } => StatusCode::NOT_FOUND,
        Rejection::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
        Rejection::InsufficientResources { .. } | Rejection::NoResourcesAvailable => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Rejection::AlreadyOwned { .. } => StatusCode::CONFLICT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut remaining_seconds = None;
        let mut shortfalls = None;

        let (status, message) = match self {
            Self::Game(GameError::Rejected(rejection)) => {
                tracing::debug!(%rejection, "Request rejected");
                let status = rejection_status(&rejection);
                let message = rejection.to_string();
                match rejection {
                    Rejection::CooldownActive {
                        remaining_seconds: secs,
                    } => remaining_seconds = Some(secs),
                    Rejection::InsufficientResources { shortfalls: s } => shortfalls = Some(s),
                    _ => {}
                }
                (status, message)
            }
            Self::Game(GameError::Infrastructure(detail)) => {
                tracing::error!(%detail, "Game operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_owned())
            }
            Self::InvalidUuid(msg) => (StatusCode::BAD_REQUEST, format!("invalid UUID: {msg}")),
        };

        let body = ErrorBody {
            success: false,
            error: message,
            status: status.as_u16(),
            remaining_seconds,
            shortfalls,
        };

        (status, axum::Json(body)).into_response()
    }
}
