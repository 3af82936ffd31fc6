//! API Response types
//!
//! Every response body, success or failure, uses the same envelope:
//! ```json
//! { "code": 200, "message": "success", "data": { ... } }
//! { "code": 401, "message": "failed",  "data": "用户未登录" }
//! ```
//! `code` mirrors the HTTP status of the response.

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Message carried by every successful response
pub const MESSAGE_SUCCESS: &str = "success";
/// Message carried by every failed response
pub const MESSAGE_FAILED: &str = "failed";

/// Unified API response structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP status code of the response
    pub code: u16,
    /// `"success"` or `"failed"`
    pub message: String,
    /// Payload on success, localized error message on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a successful (200) response
    pub fn ok(data: T) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: MESSAGE_SUCCESS.to_string(),
            data: Some(data),
        }
    }

    /// Whether this envelope describes a success
    pub fn is_success(&self) -> bool {
        self.message == MESSAGE_SUCCESS
    }
}

impl ApiResponse<String> {
    /// Create a failed response carrying the error message as data
    pub fn failed(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: MESSAGE_FAILED.to_string(),
            data: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_envelope_shape() {
        let body = ApiResponse::failed(StatusCode::UNAUTHORIZED, "用户未登录");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "code": 401, "message": "failed", "data": "用户未登录" })
        );
        assert!(!body.is_success());
    }

    #[test]
    fn test_ok_envelope_shape() {
        let body = ApiResponse::ok("aaa");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "code": 200, "message": "success", "data": "aaa" })
        );
        assert!(body.is_success());
    }
}
