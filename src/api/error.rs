/// Request error taxonomy
///
/// Handlers return `ApiResult`; every variant renders the error envelope with
/// its own status. Persistence causes are logged server-side and never leak
/// into the response body.

use super::envelope::Envelope;
use crate::catalog::ValidationErrors;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Body could not be parsed as the expected payload
    #[error("{0}")]
    MalformedInput(&'static str),

    #[error(transparent)]
    ValidationFailed(#[from] ValidationErrors),

    /// A foreign reference points at a row that does not exist
    #[error("{0}")]
    ReferenceNotFound(&'static str),

    #[error("{0} not found")]
    ResourceNotFound(&'static str),

    /// Storage failed; the cause was logged when this was built
    #[error("{0}")]
    PersistenceFailure(String),

    #[error("Too many requests. Calm down, champ.")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("Route not found")]
    RouteNotFound,
}

impl ApiError {
    /// Wrap a storage error, logging the cause
    pub fn persistence(message: impl Into<String>, cause: anyhow::Error) -> Self {
        let message = message.into();
        tracing::error!("❌ {}: {:#}", message, cause);
        Self::PersistenceFailure(message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedInput(_) | Self::ValidationFailed(_) | Self::ReferenceNotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ResourceNotFound(_) | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = Envelope::error(self.status_code(), self.to_string()).into_response();

        if let Self::RateLimitExceeded { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }

        response
    }
}

/// Fallback handler for unmatched paths
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}
