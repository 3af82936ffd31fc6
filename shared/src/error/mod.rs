//! Unified error system for the booking system
//!
//! - [`ErrorCode`]: Standardized error codes with localized messages
//! - [`ErrorCategory`]: Classification of errors by code range
//! - [`AppError`]: Error type carrying a code and a message
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 8xxx: User errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::NotAuthenticated);
//! assert_eq!(err.message, "用户未登录");
//!
//! let err = AppError::validation("用户名不能为空");
//! assert_eq!(err.code, ErrorCode::ValidationFailed);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
