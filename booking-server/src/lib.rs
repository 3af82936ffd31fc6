//! Booking Server - 会议室预约系统的请求鉴权核心
//!
//! # 架构概述
//!
//! - **令牌** (`auth::jwt`): HS256 访问令牌 / 刷新令牌
//! - **授权快照** (`auth::snapshot`): 角色名 + 去重后的权限
//! - **守卫链** (`auth::guard`): 认证 → 授权，按路由策略执行
//! - **签发与刷新** (`auth::issuer`): 登录签发令牌对，刷新令牌换新
//! - **HTTP API** (`api`): 用户相关路由
//!
//! # 模块结构
//!
//! ```text
//! booking-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # 令牌、快照、守卫链、策略表、签发
//! ├── db/            # 用户 / 角色 / 权限存储
//! ├── cache/         # 验证码缓存
//! ├── services/      # 邮件
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、时间、校验
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCode};

pub use utils::logger::init_logger_with_file;

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        )
    };
}

/// 加载 .env 并初始化日志
///
/// 日志设置在 [`Config`] 之前读取，配置加载过程中的告警 (例如临时 JWT 密钥) 也会被记录。
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | LOG_LEVEL | info | 日志级别 (`RUST_LOG` 优先) |
/// | LOG_DIR | - | 日志目录，设置后按天滚动写文件 |
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}
