//! Shared types for the meeting-room booking system
//!
//! Error codes, the response envelope and the request/response DTOs used by
//! the server and its clients.

pub mod client;
pub mod error;
pub mod response;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use response::ApiResponse;
pub use serde::{Deserialize, Serialize};
