//! 令牌签发与刷新
//!
//! 登录时校验密码并签发一对令牌；刷新时只校验刷新令牌，
//! 从存储重新计算授权快照后签发全新的一对。两者都不保存会话。

use std::sync::Arc;

use shared::client::{LoginUserVo, RefreshTokenVo};

use crate::auth::snapshot::{UserSnapshot, build_snapshot, load_snapshot};
use crate::auth::{AuthError, JwtService, RefreshClaims};
use crate::db::{User, UserStore};
use crate::security_log;

/// 访问令牌 + 刷新令牌
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for RefreshTokenVo {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

/// 登录结果
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub snapshot: UserSnapshot,
    pub tokens: TokenPair,
}

impl LoginOutcome {
    pub fn into_vo(self) -> LoginUserVo {
        LoginUserVo {
            user_info: self.snapshot.user_info(&self.user),
            access_token: self.tokens.access_token,
            refresh_token: self.tokens.refresh_token,
        }
    }
}

/// 令牌签发服务
#[derive(Clone)]
pub struct TokenIssuer {
    jwt: Arc<JwtService>,
    store: Arc<dyn UserStore>,
}

impl TokenIssuer {
    pub fn new(jwt: Arc<JwtService>, store: Arc<dyn UserStore>) -> Self {
        Self { jwt, store }
    }

    /// 用户名密码登录
    ///
    /// `is_admin` 区分普通登录与管理员登录，只匹配对应类型的用户。
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<LoginOutcome, AuthError> {
        let user = self
            .store
            .find_by_username(username, is_admin)
            .await?
            .ok_or(AuthError::NotFound)?;

        let password_valid = user
            .verify_password(password)
            .map_err(|e| AuthError::Storage(format!("Stored password hash is unreadable: {e}")))?;
        if !password_valid {
            security_log!(
                "WARN",
                "login_failed",
                username = username.to_string(),
                reason = "password_mismatch"
            );
            return Err(AuthError::PasswordMismatch);
        }

        if user.is_frozen {
            security_log!(
                "WARN",
                "login_failed",
                username = username.to_string(),
                reason = "account_frozen"
            );
            return Err(AuthError::AccountFrozen);
        }

        let snapshot = build_snapshot(&user);
        let tokens = self.mint(&snapshot)?;

        tracing::info!(user_id = user.id, username = %user.username, is_admin, "User logged in");
        Ok(LoginOutcome {
            user,
            snapshot,
            tokens,
        })
    }

    /// 用刷新令牌换取新的令牌对
    ///
    /// 不校验密码；角色和权限按当前存储重新计算。
    pub async fn refresh(&self, refresh_token: &str, is_admin: bool) -> Result<TokenPair, AuthError> {
        let claims = self.jwt.verify_refresh(refresh_token).map_err(|e| {
            security_log!("WARN", "refresh_failed", error = e.to_string());
            AuthError::SessionExpired
        })?;

        let (user, snapshot) = match load_snapshot(self.store.as_ref(), claims.user_id, is_admin).await
        {
            Ok(found) => found,
            Err(AuthError::NotFound) => return Err(AuthError::SessionExpired),
            Err(e) => return Err(e),
        };

        if user.is_frozen {
            return Err(AuthError::AccountFrozen);
        }

        let tokens = self.mint(&snapshot)?;
        tracing::debug!(user_id = user.id, "Token pair refreshed");
        Ok(tokens)
    }

    fn mint(&self, snapshot: &UserSnapshot) -> Result<TokenPair, AuthError> {
        let access_token = self.jwt.issue_access(&snapshot.access_claims())?;
        let refresh_token = self.jwt.issue_refresh(&RefreshClaims {
            user_id: snapshot.id,
        })?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
