//! HTTP API
//!
//! 所有路由通过 [`PolicyRouter`] 登记，路由与访问策略同时声明。

pub mod extract;
pub mod health;
pub mod logging;
pub mod user;

use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue, StatusCode};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::{GuardPipeline, PolicyRouter, RouteGuard, enforce_route_policy};
use crate::core::ServerState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// 全部业务路由及其策略 (无中间件、无状态)
pub fn build_router() -> PolicyRouter<ServerState> {
    PolicyRouter::new()
        .merge(user::router())
        .merge(health::router())
}

/// Build a fully configured application with all middleware and state
pub fn build_app(state: ServerState) -> Router {
    build_app_with(state, build_router())
}

/// 使用给定路由构建应用
pub fn build_app_with(state: ServerState, routes: PolicyRouter<ServerState>) -> Router {
    let (router, table) = routes.into_parts();
    let guard = RouteGuard::new(table, GuardPipeline::standard(state.get_jwt_service()));
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    router
        // Route policy (authentication → authorization), innermost
        .layer(axum_middleware::from_fn_with_state(
            guard,
            enforce_route_policy,
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Request logging
        .layer(axum_middleware::from_fn(logging::logging_middleware))
        .layer(TraceLayer::new_for_http())
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        // Request ID - outermost so every layer above sees it
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RoutePolicy;
    use http::Method;

    #[test]
    fn test_route_policies() {
        let (_, table) = build_router().into_parts();

        let public = [
            (Method::POST, "/user/login"),
            (Method::POST, "/user/admin/login"),
            (Method::GET, "/user/refresh"),
            (Method::GET, "/user/admin/refresh"),
            (Method::GET, "/user/register-captcha"),
            (Method::POST, "/user/register"),
            (Method::GET, "/user/init-data"),
            (Method::GET, "/user/bbb"),
            (Method::GET, "/health"),
        ];
        for (method, path) in public {
            assert_eq!(table.lookup(&method, path), &RoutePolicy::public(), "{path}");
        }

        assert_eq!(
            table.lookup(&Method::GET, "/user/info"),
            &RoutePolicy::login()
        );
        assert_eq!(
            table.lookup(&Method::GET, "/user/freeze"),
            &RoutePolicy::login()
        );
        assert_eq!(
            table.lookup(&Method::GET, "/user/aaa"),
            &RoutePolicy::permissions(["ccc"])
        );
        assert_eq!(table.len(), 12);
    }
}
