//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors returned by the route handlers.
///
/// Each variant maps to a status code and a plain-text body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// `rolls` was absent or not an integer.
    #[error("Request parameter 'rolls' is missing or not a number.")]
    InvalidRolls,

    /// `rolls` was an integer outside the accepted range.
    #[error("Request parameter 'rolls' must be between 1 and {max}.")]
    RollsOutOfRange {
        /// Largest accepted value.
        max: i64,
    },

    /// `count` was not an integer.
    #[error("Request parameter 'count' is not a number.")]
    InvalidCount,

    /// `count` was an integer outside the accepted range.
    #[error("Request parameter 'count' must be between 1 and {max}.")]
    CountOutOfRange {
        /// Largest accepted value.
        max: i64,
    },

    /// A background task failed before the request could complete.
    #[error("{0}")]
    AsyncFailure(String),
}

impl ApiError {
    /// Status code sent for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRolls
            | Self::RollsOutOfRange { .. }
            | Self::InvalidCount
            | Self::CountOutOfRange { .. } => StatusCode::BAD_REQUEST,
            Self::AsyncFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
