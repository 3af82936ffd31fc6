//! Unified error codes for the booking system
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so that clients can match
/// on them without parsing the localized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// No credential was presented on a guarded route
    NotAuthenticated = 1001,
    /// Password does not match the stored hash
    PasswordMismatch = 1002,
    /// Access token is invalid or expired
    TokenInvalid = 1004,
    /// Refresh token is invalid or expired
    SessionExpired = 1005,
    /// Account is frozen
    AccountFrozen = 1007,
    /// Captcha expired or does not match
    CaptchaInvalid = 1008,
    /// Captcha was requested again before the previous one expired
    CaptchaTooFrequent = 1009,
    /// Refresh token parameter missing
    TokenMissing = 1010,

    // ==================== 2xxx: Permission ====================
    /// Caller lacks a permission the route requires
    PermissionDenied = 2001,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// Username already taken
    UsernameExists = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the user-facing (localized) message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "success",
            ErrorCode::Unknown => "未知错误",
            ErrorCode::ValidationFailed => "参数校验失败",
            ErrorCode::NotFound => "资源不存在",
            ErrorCode::AlreadyExists => "资源已存在",
            ErrorCode::InvalidRequest => "无效请求",
            ErrorCode::RequiredField => "缺少必填字段",

            // Auth
            ErrorCode::NotAuthenticated => "用户未登录",
            ErrorCode::PasswordMismatch => "密码错误",
            ErrorCode::TokenInvalid => "token已失效，请重新登录！",
            ErrorCode::SessionExpired => "token 已失效, 请重新登录！",
            ErrorCode::AccountFrozen => "账号已被冻结",
            ErrorCode::CaptchaInvalid => "验证码已过期或者不正确！",
            ErrorCode::CaptchaTooFrequent => "验证码已发送，请勿频繁操作",
            ErrorCode::TokenMissing => "token不存在",

            // Permission
            ErrorCode::PermissionDenied => "您暂无当前接口访问权限！",

            // User
            ErrorCode::UserNotFound => "用户不存在",
            ErrorCode::UsernameExists => "用户已存在！",

            // System
            ErrorCode::InternalError => "服务器内部错误",
            ErrorCode::DatabaseError => "数据库错误",
            ErrorCode::ConfigError => "配置错误",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::PasswordMismatch),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::SessionExpired),
            1007 => Ok(ErrorCode::AccountFrozen),
            1008 => Ok(ErrorCode::CaptchaInvalid),
            1009 => Ok(ErrorCode::CaptchaTooFrequent),
            1010 => Ok(ErrorCode::TokenMissing),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // User
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::UsernameExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::TokenInvalid.code(), 1004);
        assert_eq!(ErrorCode::SessionExpired.code(), 1005);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::UserNotFound.code(), 8001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_roundtrips_known_codes() {
        for code in [
            ErrorCode::NotAuthenticated,
            ErrorCode::PasswordMismatch,
            ErrorCode::CaptchaTooFrequent,
            ErrorCode::UsernameExists,
            ErrorCode::ConfigError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_wire_messages() {
        assert_eq!(ErrorCode::NotAuthenticated.message(), "用户未登录");
        assert_eq!(ErrorCode::TokenInvalid.message(), "token已失效，请重新登录！");
        assert_eq!(ErrorCode::PermissionDenied.message(), "您暂无当前接口访问权限！");
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::SessionExpired).unwrap();
        assert_eq!(json, "1005");
        let code: ErrorCode = serde_json::from_str("2001").unwrap();
        assert_eq!(code, ErrorCode::PermissionDenied);
    }
}
