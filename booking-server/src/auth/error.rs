//! 认证授权错误

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::auth::JwtError;
use crate::db::RepoError;

/// 认证授权错误
///
/// 守卫链与令牌签发流程的全部失败都归入这里，再在 HTTP 边界映射为 [`AppError`]。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // ========== 守卫 ==========
    /// 需要登录但没有 Authorization 头
    #[error("not authenticated")]
    Unauthenticated,

    /// 凭证无法解析、签名错误或已过期
    #[error("invalid credential")]
    InvalidCredential,

    /// 缺少路由要求的权限代码
    #[error("missing permission: {0}")]
    Forbidden(String),

    // ========== 签发 / 刷新 ==========
    /// 刷新令牌无效或用户已不存在
    #[error("session expired")]
    SessionExpired,

    #[error("user not found")]
    NotFound,

    #[error("password mismatch")]
    PasswordMismatch,

    #[error("account frozen")]
    AccountFrozen,

    /// 用户名已被占用
    #[error("duplicate principal: {0}")]
    DuplicatePrincipal(String),

    /// 角色、权限等其他唯一键冲突
    #[error("conflict: {0}")]
    Conflict(String),

    // ========== 系统 ==========
    #[error("storage error: {0}")]
    Storage(String),

    #[error("token generation failed: {0}")]
    TokenGeneration(String),
}

impl From<RepoError> for AuthError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(_) => AuthError::NotFound,
            RepoError::Duplicate(msg) => AuthError::Conflict(msg),
            RepoError::Database(msg) => AuthError::Storage(msg),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::GenerationFailed(msg)
            | JwtError::KeyGenerationFailed(msg)
            | JwtError::ConfigError(msg) => AuthError::TokenGeneration(msg),
            JwtError::InvalidSignature
            | JwtError::ExpiredToken
            | JwtError::WrongTokenType { .. } => AuthError::InvalidCredential,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => AppError::not_authenticated(),
            AuthError::InvalidCredential => AppError::invalid_token(),
            AuthError::Forbidden(_) => AppError::permission_denied(),
            AuthError::SessionExpired => AppError::session_expired(),
            AuthError::NotFound => AppError::new(ErrorCode::UserNotFound),
            AuthError::PasswordMismatch => AppError::new(ErrorCode::PasswordMismatch),
            AuthError::AccountFrozen => AppError::new(ErrorCode::AccountFrozen),
            AuthError::DuplicatePrincipal(_) => AppError::new(ErrorCode::UsernameExists),
            AuthError::Conflict(_) => AppError::new(ErrorCode::AlreadyExists),
            AuthError::Storage(msg) => AppError::database(msg),
            AuthError::TokenGeneration(msg) => AppError::internal(msg),
        }
    }
}

impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}
