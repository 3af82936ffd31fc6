//! JWT 令牌服务
//!
//! 访问令牌 (access) 与刷新令牌 (refresh) 使用同一套 HS256 签名，
//! 只在载荷结构、`tokenType` 和有效期上不同。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::time::parse_ttl;

/// 访问令牌默认有效期
pub const DEFAULT_ACCESS_TTL: &str = "30m";
/// 刷新令牌默认有效期
pub const DEFAULT_REFRESH_TTL: &str = "7d";

const MIN_SECRET_LEN: usize = 32;

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC 密钥 (至少 32 字节)
    pub secret: String,
    /// 访问令牌有效期
    pub access_ttl: Duration,
    /// 刷新令牌有效期
    pub refresh_ttl: Duration,
}

impl JwtConfig {
    /// 使用指定密钥和默认有效期 (30 分钟 / 7 天)
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: Duration::minutes(30),
            refresh_ttl: Duration::days(7),
        }
    }

    /// 从环境变量加载
    ///
    /// | 环境变量 | 默认值 |
    /// |----------|--------|
    /// | JWT_SECRET | 开发环境随机生成，生产环境必填 |
    /// | JWT_ACCESS_TOKEN_EXPIRE_TIME | 30m |
    /// | JWT_REFRESH_TOKEN_EXPIRE_TIME | 7d |
    pub fn from_env() -> Result<Self, JwtError> {
        let secret = String::from_utf8(load_jwt_secret()?)
            .map_err(|_| JwtError::ConfigError("JWT_SECRET is not valid UTF-8".to_string()))?;

        let access_ttl = ttl_from_env("JWT_ACCESS_TOKEN_EXPIRE_TIME", DEFAULT_ACCESS_TTL)?;
        let refresh_ttl = ttl_from_env("JWT_REFRESH_TOKEN_EXPIRE_TIME", DEFAULT_REFRESH_TTL)?;

        Ok(Self {
            secret,
            access_ttl,
            refresh_ttl,
        })
    }
}

fn ttl_from_env(key: &str, default: &str) -> Result<Duration, JwtError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_ttl(&raw).ok_or_else(|| JwtError::ConfigError(format!("{key}: invalid duration '{raw}'")))
}

/// 令牌类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// 访问令牌载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_id: i64,
    pub username: String,
    pub roles: Vec<String>,
    /// 权限代码
    pub permissions: Vec<String>,
}

/// 刷新令牌载荷 (只含用户 ID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub user_id: i64,
}

/// 令牌中实际编码的内容: 载荷 + 类型 + 签发/过期时间
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims<P> {
    #[serde(flatten)]
    payload: P,
    #[serde(rename = "tokenType")]
    token_type: TokenType,
    iat: i64,
    exp: i64,
}

/// JWT 错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    /// 签名不匹配或令牌结构被篡改
    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("令牌类型不匹配: 期望 {expected:?}")]
    WrongTokenType { expected: TokenType },

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),

    #[error("密钥生成失败: {0}")]
    KeyGenerationFailed(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

/// 生成安全的 JWT 密钥
pub fn generate_secure_jwt_secret() -> Result<Vec<u8>, JwtError> {
    let rng = SystemRandom::new();
    let mut key = vec![0u8; 32]; // 256-bit key

    rng.fill(&mut key).map_err(|_| {
        JwtError::KeyGenerationFailed("Failed to generate secure random key".to_string())
    })?;

    Ok(key)
}

/// 生成可打印的安全 JWT 密钥 (用于开发环境)
pub fn generate_secure_printable_jwt_secret() -> Result<String, JwtError> {
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?";

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    rng.fill(&mut bytes).map_err(|_| {
        JwtError::KeyGenerationFailed("Failed to generate secure random key".to_string())
    })?;

    Ok(bytes
        .iter()
        .map(|b| ALLOWED[*b as usize % ALLOWED.len()] as char)
        .collect())
}

/// 从环境变量安全地加载 JWT 密钥
fn load_jwt_secret() -> Result<Vec<u8>, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) => {
            if secret.len() < MIN_SECRET_LEN {
                return Err(JwtError::ConfigError(format!(
                    "JWT_SECRET must be at least {MIN_SECRET_LEN} characters long"
                )));
            }
            Ok(secret.into_bytes())
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!(
                    "JWT_SECRET not set! Generating temporary key for development; tokens will not survive a restart."
                );
                Ok(generate_secure_printable_jwt_secret()?.into_bytes())
            }
            #[cfg(not(debug_assertions))]
            {
                Err(JwtError::ConfigError(
                    "JWT_SECRET environment variable must be set in production!".to_string(),
                ))
            }
        }
    }
}

/// JWT 令牌服务
///
/// 密钥在启动时加载一次，运行期间只读，可在请求间无锁共享。
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_ttl", &self.config.access_ttl)
            .field("refresh_ttl", &self.config.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// 使用指定配置创建 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 使用随机密钥创建 JWT 服务
    pub fn new_with_secure_key() -> Result<Self, JwtError> {
        let secret = generate_secure_printable_jwt_secret()?;
        Ok(Self::with_config(JwtConfig::new(secret)))
    }

    /// 签发访问令牌
    pub fn issue_access(&self, claims: &AccessClaims) -> Result<String, JwtError> {
        self.sign_at(
            claims,
            TokenType::Access,
            self.config.access_ttl,
            Utc::now().timestamp(),
        )
    }

    /// 签发刷新令牌
    pub fn issue_refresh(&self, claims: &RefreshClaims) -> Result<String, JwtError> {
        self.sign_at(
            claims,
            TokenType::Refresh,
            self.config.refresh_ttl,
            Utc::now().timestamp(),
        )
    }

    /// 校验访问令牌
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, JwtError> {
        self.verify_at(token, TokenType::Access, Utc::now().timestamp())
    }

    /// 校验刷新令牌
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        self.verify_at(token, TokenType::Refresh, Utc::now().timestamp())
    }

    /// 以给定时刻 `now` (unix 秒) 签发令牌，过期时间为 `now + ttl`
    pub fn sign_at<T: Serialize>(
        &self,
        payload: &T,
        token_type: TokenType,
        ttl: Duration,
        now: i64,
    ) -> Result<String, JwtError> {
        let claims = Claims {
            payload,
            token_type,
            iat: now,
            exp: now + ttl.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 以给定时刻 `now` 校验令牌并返回原样载荷
    ///
    /// `now >= exp` 即视为过期。过期只在签名通过后判断，
    /// 因此被篡改的令牌总是报告 [`JwtError::InvalidSignature`]。
    pub fn verify_at<T: DeserializeOwned + Clone>(
        &self,
        token: &str,
        expected: TokenType,
        now: i64,
    ) -> Result<T, JwtError> {
        let token_data =
            decode::<Claims<T>>(token, &self.decoding_key, &validation()).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                    _ => {
                        tracing::debug!(error = %e, "Token rejected");
                        JwtError::InvalidSignature
                    }
                }
            })?;

        let claims = token_data.claims;
        if now >= claims.exp {
            return Err(JwtError::ExpiredToken);
        }
        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType { expected });
        }

        Ok(claims.payload)
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    // exp is compared against the caller's clock in verify_at
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);
    validation
}

/// 当前用户上下文 (从访问令牌解析)
///
/// 由认证守卫创建，只在当前请求内有效。
///
/// ```ignore
/// async fn handler(user: CurrentUser) -> AppResult<Json<ApiResponse<String>>> {
///     Ok(ok(user.username))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// 用户 ID
    pub id: i64,
    /// 用户名
    pub username: String,
    /// 角色名称
    pub roles: Vec<String>,
    /// 权限代码
    pub permissions: Vec<String>,
}

impl From<AccessClaims> for CurrentUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
            roles: claims.roles,
            permissions: claims.permissions,
        }
    }
}

impl CurrentUser {
    /// 检查是否拥有指定权限代码 (精确匹配)
    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.iter().any(|p| p == code)
    }

    /// 按声明顺序返回第一个缺失的权限代码
    pub fn first_missing<'a>(&self, required: &'a [String]) -> Option<&'a str> {
        required
            .iter()
            .find(|code| !self.has_permission(code))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    const SECRET: &str = "unit-test-secret-that-is-long-enough-0123";

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig::new(SECRET))
    }

    fn access_claims() -> AccessClaims {
        AccessClaims {
            user_id: 1,
            username: "zhangsan".to_string(),
            roles: vec!["管理员".to_string()],
            permissions: vec!["ccc".to_string(), "ddd".to_string()],
        }
    }

    #[test]
    fn test_access_token_roundtrip() {
        let service = service();
        let token = service
            .issue_access(&access_claims())
            .expect("Failed to generate test token");

        let claims = service
            .verify_access(&token)
            .expect("Failed to validate test token");
        assert_eq!(claims, access_claims());
    }

    #[test]
    fn test_refresh_token_carries_only_user_id() {
        let service = service();
        let token = service
            .issue_refresh(&RefreshClaims { user_id: 7 })
            .expect("Failed to generate refresh token");

        let claims = service.verify_refresh(&token).unwrap();
        assert_eq!(claims.user_id, 7);

        // The payload segment must not leak role/permission data
        let payload = token.split('.').nth(1).unwrap();
        assert!(!payload.is_empty());
        let json = String::from_utf8(
            URL_SAFE_NO_PAD
                .decode(payload)
                .expect("payload should be base64url"),
        )
        .unwrap();
        assert!(!json.contains("permissions"));
        assert!(!json.contains("roles"));
    }

    #[test]
    fn test_expiry_boundary() {
        let service = service();
        let now = 1_700_000_000;
        let ttl = Duration::minutes(30);
        let token = service
            .sign_at(&access_claims(), TokenType::Access, ttl, now)
            .unwrap();

        let before = service.verify_at::<AccessClaims>(
            &token,
            TokenType::Access,
            now + ttl.num_seconds() - 1,
        );
        assert!(before.is_ok());

        let at = service.verify_at::<AccessClaims>(&token, TokenType::Access, now + ttl.num_seconds());
        assert_eq!(at, Err(JwtError::ExpiredToken));

        let after = service.verify_at::<AccessClaims>(
            &token,
            TokenType::Access,
            now + ttl.num_seconds() + 3600,
        );
        assert_eq!(after, Err(JwtError::ExpiredToken));
    }

    #[test]
    fn test_single_byte_mutation_never_accepted() {
        let service = service();
        let now = 1_700_000_000;
        let token = service
            .sign_at(&access_claims(), TokenType::Access, Duration::minutes(30), now)
            .unwrap();

        let bytes = token.as_bytes();
        for i in 0..bytes.len() {
            let mut mutated = bytes.to_vec();
            mutated[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let mutated = String::from_utf8(mutated).unwrap();

            let result = service.verify_at::<AccessClaims>(&mutated, TokenType::Access, now);
            assert_eq!(
                result,
                Err(JwtError::InvalidSignature),
                "mutation at byte {i} was not rejected as a signature failure"
            );
        }
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let other = JwtService::with_config(JwtConfig::new(
            "another-secret-that-is-also-long-enough-xyz",
        ));
        let token = other.issue_access(&access_claims()).unwrap();
        assert_eq!(
            service().verify_access(&token),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let service = service();
        let access = service.issue_access(&access_claims()).unwrap();
        let refresh = service.issue_refresh(&RefreshClaims { user_id: 1 }).unwrap();

        assert_eq!(
            service.verify_refresh(&access),
            Err(JwtError::WrongTokenType {
                expected: TokenType::Refresh
            })
        );
        assert!(service.verify_access(&refresh).is_err());
    }

    #[test]
    fn test_current_user_permissions() {
        let user = CurrentUser::from(access_claims());

        assert!(user.has_permission("ccc"));
        assert!(!user.has_permission("cc"));
        assert!(!user.has_permission("zzz"));

        let required = vec!["ccc".to_string(), "xxx".to_string(), "yyy".to_string()];
        assert_eq!(user.first_missing(&required), Some("xxx"));
        assert_eq!(user.first_missing(&["ddd".to_string()]), None);
    }

    #[test]
    fn test_secure_key_generation() {
        let key1 = generate_secure_jwt_secret().expect("Failed to generate first secure key");
        let key2 = generate_secure_jwt_secret().expect("Failed to generate second secure key");
        assert_ne!(key1, key2);
        assert_eq!(key1.len(), 32);

        let printable = generate_secure_printable_jwt_secret().unwrap();
        assert_eq!(printable.len(), 64);
        assert!(printable.len() >= MIN_SECRET_LEN);
    }

    #[test]
    fn test_jwt_service_with_secure_key() {
        let service = JwtService::new_with_secure_key()
            .expect("Failed to create JWT service with secure key");
        let token = service.issue_access(&access_claims()).unwrap();
        assert_eq!(service.verify_access(&token).unwrap(), access_claims());
    }
}
