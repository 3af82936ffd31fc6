//! Client-facing request/response types
//!
//! Field names follow the wire format clients already depend on, which is
//! why the login and refresh payloads use different casing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export ApiResponse from response module
pub use crate::response::ApiResponse;

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Permission descriptor as exposed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionInfo {
    pub id: i64,
    pub code: String,
    pub description: String,
}

/// User summary returned at login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub nick_name: String,
    pub email: String,
    pub head_pic: Option<String>,
    pub phone_number: Option<String>,
    pub is_frozen: bool,
    pub is_admin: bool,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub roles: Vec<String>,
    pub permissions: Vec<PermissionInfo>,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserVo {
    pub user_info: UserInfo,
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh query parameters (`?refreshToken=...`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshQuery {
    pub refresh_token: Option<String>,
}

/// Refresh response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenVo {
    pub access_token: String,
    pub refresh_token: String,
}

// =============================================================================
// User API DTOs
// =============================================================================

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub username: String,
    pub nick_name: String,
    pub password: String,
    pub email: String,
    pub captcha: String,
}

/// Profile of the current user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailVo {
    pub id: i64,
    pub username: String,
    pub nick_name: String,
    pub email: String,
    pub head_pic: Option<String>,
    pub phone_number: Option<String>,
    pub is_frozen: bool,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}
