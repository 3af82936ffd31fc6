//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 简单健康检查 | 无 |

use axum::Json;
use serde::Serialize;

use crate::auth::{PolicyRouter, RoutePolicy};
use crate::core::ServerState;
use crate::utils::{ApiResponse, ok};

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> PolicyRouter<ServerState> {
    PolicyRouter::new().get("/health", health, RoutePolicy::public())
}

/// 简单健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 状态 (ok)
    status: &'static str,
    /// 版本号
    version: &'static str,
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
