use crate::auth::JwtConfig;
use crate::core::Result;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | SERVER_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | JWT_SECRET | 开发环境随机生成 | 签名密钥 (见 [`JwtConfig::from_env`]) |
/// | JWT_ACCESS_TOKEN_EXPIRE_TIME | 30m | 访问令牌有效期 |
/// | JWT_REFRESH_TOKEN_EXPIRE_TIME | 7d | 刷新令牌有效期 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | DATABASE_URL | sqlite:booking.db | SQLite 数据库 |
/// | SEED_DEMO_DATA | 非生产环境为 true | 启动时写入演示用户 |
///
/// 日志相关的 `LOG_LEVEL` / `LOG_DIR` 在加载配置之前由
/// [`crate::setup_environment`] 读取。
///
/// # 示例
///
/// ```ignore
/// SERVER_PORT=8080 JWT_ACCESS_TOKEN_EXPIRE_TIME=15m cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | production
    pub environment: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// sqlx 连接串，`sqlite::memory:` 为内存库
    pub database_url: String,
    /// 启动时写入演示数据
    pub seed_demo_data: bool,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 除 JWT 配置外，未设置或无法解析的值使用默认值
    pub fn from_env() -> Result<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let seed_default = !is_production_env(&environment);

        Ok(Self {
            http_port: env_or("SERVER_PORT", 3000),
            environment,
            jwt: JwtConfig::from_env()?,
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30000),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.into()),
            seed_demo_data: env_or("SEED_DEMO_DATA", seed_default),
        })
    }

    /// 使用给定 JWT 配置与默认值
    ///
    /// 常用于测试场景
    pub fn with_jwt(jwt: JwtConfig) -> Self {
        Self {
            http_port: 3000,
            environment: "development".into(),
            jwt,
            request_timeout_ms: 30000,
            database_url: "sqlite::memory:".into(),
            seed_demo_data: true,
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        is_production_env(&self.environment)
    }
}

const DEFAULT_DATABASE_URL: &str = "sqlite:booking.db";

fn is_production_env(environment: &str) -> bool {
    environment.eq_ignore_ascii_case("production")
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
