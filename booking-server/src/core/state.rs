use std::sync::Arc;

use crate::auth::{JwtService, TokenIssuer};
use crate::cache::{Cache, MemoryCache};
use crate::core::{Config, Result};
use crate::db::{SqliteUserStore, UserStore, seed::seed_demo_data};
use crate::services::{LogMailer, Mailer};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 克隆成本低 (全部是 `Arc`)，作为 axum 的 `State` 注入每个 handler。
///
/// | 字段 | 说明 |
/// |------|------|
/// | store | 用户 / 角色 / 权限存储 |
/// | cache | 验证码缓存 |
/// | mailer | 邮件发送 |
/// | jwt_service | 令牌编解码 (只读密钥) |
/// | issuer | 登录签发与刷新 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    pub store: Arc<dyn UserStore>,
    pub cache: Arc<dyn Cache>,
    pub mailer: Arc<dyn Mailer>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    pub issuer: TokenIssuer,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    pub fn new(
        config: Config,
        store: Arc<dyn UserStore>,
        cache: Arc<dyn Cache>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let issuer = TokenIssuer::new(jwt_service.clone(), store.clone());

        Self {
            config,
            store,
            cache,
            mailer,
            jwt_service,
            issuer,
        }
    }

    /// 打开数据库并初始化，按配置写入演示数据
    pub async fn initialize(config: &Config) -> Result<Self> {
        let store = SqliteUserStore::connect(&config.database_url).await?;
        let state = Self::new(
            config.clone(),
            Arc::new(store),
            Arc::new(MemoryCache::new()),
            Arc::new(LogMailer),
        );

        if config.seed_demo_data {
            seed_demo_data(state.store.as_ref()).await?;
        }

        Ok(state)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
