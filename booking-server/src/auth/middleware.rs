//! 路由策略中间件
//!
//! 对所有路由生效：按 `MatchedPath` + 方法查出策略，执行守卫链，
//! 通过后把 [`CurrentUser`] 放进请求扩展供 handler 取用。

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, CurrentUser, GuardPipeline, PolicyTable};
use crate::security_log;

/// 中间件状态：策略表 + 守卫链
#[derive(Debug, Clone)]
pub struct RouteGuard {
    table: Arc<PolicyTable>,
    pipeline: Arc<GuardPipeline>,
}

impl RouteGuard {
    pub fn new(table: PolicyTable, pipeline: GuardPipeline) -> Self {
        Self {
            table: Arc::new(table),
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn table(&self) -> &PolicyTable {
        &self.table
    }
}

/// 执行路由策略
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 | data |
/// |------|------------|------|
/// | 无 Authorization 头 | 401 | 用户未登录 |
/// | 令牌无效或过期 | 401 | token已失效，请重新登录！ |
/// | 缺少权限 | 401 | 您暂无当前接口访问权限！ |
pub async fn enforce_route_policy(
    State(guard): State<RouteGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // CORS 预检
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 未匹配的路由交给 fallback (404)
    let Some(path) = req.extensions().get::<MatchedPath>().cloned() else {
        return Ok(next.run(req).await);
    };

    let policy = guard.table.lookup(req.method(), path.as_str());
    match guard.pipeline.run(policy, req.headers()) {
        Ok(Some(user)) => {
            req.extensions_mut().insert::<CurrentUser>(user);
            Ok(next.run(req).await)
        }
        Ok(None) => Ok(next.run(req).await),
        Err(e) => {
            match &e {
                AuthError::Forbidden(code) => security_log!(
                    "WARN",
                    "permission_denied",
                    required_permission = code.clone(),
                    uri = req.uri().to_string()
                ),
                _ => security_log!(
                    "WARN",
                    "auth_failed",
                    error = e.to_string(),
                    uri = req.uri().to_string()
                ),
            }
            Err(e)
        }
    }
}
