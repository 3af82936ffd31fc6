//! 认证授权模块
//!
//! - [`JwtService`] - 令牌编解码
//! - [`snapshot`] - 授权快照 (角色名 + 去重后的权限)
//! - [`GuardPipeline`] - 认证 → 授权守卫链
//! - [`PolicyRouter`] / [`PolicyTable`] - 路由与访问策略
//! - [`enforce_route_policy`] - 在每个请求上执行守卫链的中间件
//! - [`TokenIssuer`] - 登录签发与刷新

pub mod error;
pub mod extractor;
pub mod guard;
pub mod issuer;
pub mod jwt;
pub mod middleware;
pub mod policy;
pub mod snapshot;

pub use error::AuthError;
pub use guard::{Authentication, Authorization, GuardPipeline, GuardStage, RouteContext};
pub use issuer::{LoginOutcome, TokenIssuer, TokenPair};
pub use jwt::{
    AccessClaims, CurrentUser, JwtConfig, JwtError, JwtService, RefreshClaims, TokenType,
};
pub use middleware::{RouteGuard, enforce_route_policy};
pub use policy::{PolicyRouter, PolicyTable, RoutePolicy};
pub use snapshot::{UserSnapshot, build_snapshot, load_snapshot};
