/// Uniform response envelope
///
/// Every non-204 response carries `{status, status_code, data, message}`.
/// `data` is always present on the wire and is `null` when there is nothing
/// to return.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    /// "success" for 2xx, "error" otherwise
    pub status: String,
    /// Mirrors the HTTP status line
    pub status_code: u16,
    pub data: Option<T>,
    pub message: String,
}

impl<T> Envelope<T> {
    pub fn success(code: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            status_code: code.as_u16(),
            data: Some(data),
            message: message.into(),
        }
    }

    /// 200 OK shorthand
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::success(StatusCode::OK, data, message)
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}

impl Envelope<Value> {
    /// Error envelope with `data: null`
    pub fn error(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            status_code: code.as_u16(),
            data: None,
            message: message.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let code = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (code, Json(self)).into_response()
    }
}
