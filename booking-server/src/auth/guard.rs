//! 守卫链
//!
//! 请求先经过 [`Authentication`] 再经过 [`Authorization`]，
//! 任一阶段失败即终止，不再执行后续阶段和 handler。

use std::sync::Arc;

use http::HeaderMap;
use http::header::AUTHORIZATION;

use crate::auth::{AuthError, CurrentUser, JwtService, RoutePolicy};

/// 单个请求在守卫链中的上下文
#[derive(Debug, Clone)]
pub struct RouteContext<'a> {
    pub policy: &'a RoutePolicy,
    pub headers: &'a HeaderMap,
    /// 认证通过后的当前用户
    pub user: Option<CurrentUser>,
}

/// 守卫阶段
pub trait GuardStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// 放行时返回 (可能补充了信息的) 上下文
    fn check<'a>(&self, ctx: RouteContext<'a>) -> Result<RouteContext<'a>, AuthError>;
}

/// 认证守卫
///
/// | 情况 | 结果 |
/// |------|------|
/// | 路由无需登录 | 放行，不读请求头 |
/// | 无 Authorization 头 | [`AuthError::Unauthenticated`] |
/// | 头中缺少第二段 / 校验失败 / 已过期 | [`AuthError::InvalidCredential`] |
pub struct Authentication {
    jwt: Arc<JwtService>,
}

impl Authentication {
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }
}

impl GuardStage for Authentication {
    fn name(&self) -> &'static str {
        "authentication"
    }

    fn check<'a>(&self, mut ctx: RouteContext<'a>) -> Result<RouteContext<'a>, AuthError> {
        if !ctx.policy.requires_auth {
            return Ok(ctx);
        }

        // 空白的 Authorization 头等同于没有
        let header = ctx
            .headers
            .get(AUTHORIZATION)
            .filter(|value| !value.as_bytes().trim_ascii().is_empty())
            .ok_or(AuthError::Unauthenticated)?;

        // "Bearer <token>": the scheme word itself is not checked
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.split_whitespace().nth(1))
            .ok_or(AuthError::InvalidCredential)?;

        let claims = self.jwt.verify_access(token).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            AuthError::InvalidCredential
        })?;

        ctx.user = Some(CurrentUser::from(claims));
        Ok(ctx)
    }
}

/// 授权守卫
///
/// 按声明顺序检查路由要求的权限，遇到第一个缺失即返回 [`AuthError::Forbidden`]。
pub struct Authorization;

impl GuardStage for Authorization {
    fn name(&self) -> &'static str {
        "authorization"
    }

    fn check<'a>(&self, ctx: RouteContext<'a>) -> Result<RouteContext<'a>, AuthError> {
        // no user means the route is public
        if let Some(user) = &ctx.user
            && let Some(missing) = user.first_missing(&ctx.policy.required_permissions)
        {
            return Err(AuthError::Forbidden(missing.to_string()));
        }

        Ok(ctx)
    }
}

/// 按顺序组合的守卫链
#[derive(Default)]
pub struct GuardPipeline {
    stages: Vec<Box<dyn GuardStage>>,
}

impl GuardPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// 认证 → 授权
    pub fn standard(jwt: Arc<JwtService>) -> Self {
        Self::new()
            .with_stage(Authentication::new(jwt))
            .with_stage(Authorization)
    }

    pub fn with_stage(mut self, stage: impl GuardStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// 依次执行各阶段，返回认证得到的当前用户 (公开路由为 `None`)
    pub fn run(
        &self,
        policy: &RoutePolicy,
        headers: &HeaderMap,
    ) -> Result<Option<CurrentUser>, AuthError> {
        let mut ctx = RouteContext {
            policy,
            headers,
            user: None,
        };

        for stage in &self.stages {
            ctx = stage.check(ctx).inspect_err(|e| {
                tracing::debug!(stage = stage.name(), error = %e, "Guard rejected request");
            })?;
        }

        Ok(ctx.user)
    }
}

impl std::fmt::Debug for GuardPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardPipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessClaims, JwtConfig};
    use http::HeaderValue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::with_config(JwtConfig::new(
            "guard-test-secret-that-is-long-enough-0123",
        )))
    }

    fn bearer(jwt: &JwtService, permissions: &[&str]) -> HeaderMap {
        let token = jwt
            .issue_access(&AccessClaims {
                user_id: 1,
                username: "zhangsan".to_string(),
                roles: vec!["管理员".to_string()],
                permissions: permissions.iter().map(|p| p.to_string()).collect(),
            })
            .unwrap();
        headers(&format!("Bearer {token}"))
    }

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(authorization).unwrap());
        headers
    }

    #[test]
    fn test_public_route_ignores_headers() {
        let pipeline = GuardPipeline::standard(jwt());
        let policy = RoutePolicy::public();

        assert_eq!(pipeline.run(&policy, &HeaderMap::new()), Ok(None));
        // even a garbage header is not inspected
        assert_eq!(pipeline.run(&policy, &headers("Bearer garbage")), Ok(None));
    }

    #[test]
    fn test_missing_header_vs_bad_token() {
        let pipeline = GuardPipeline::standard(jwt());
        let policy = RoutePolicy::login();

        assert_eq!(
            pipeline.run(&policy, &HeaderMap::new()),
            Err(AuthError::Unauthenticated)
        );
        assert_eq!(
            pipeline.run(&policy, &headers("Bearer not.a.token")),
            Err(AuthError::InvalidCredential)
        );
        assert_eq!(
            pipeline.run(&policy, &headers("Bearer")),
            Err(AuthError::InvalidCredential)
        );

        // blank header values count as absent
        assert_eq!(
            pipeline.run(&policy, &headers("")),
            Err(AuthError::Unauthenticated)
        );
        assert_eq!(
            pipeline.run(&policy, &headers("   ")),
            Err(AuthError::Unauthenticated)
        );
    }

    #[test]
    fn test_expired_token_is_invalid_credential() {
        let jwt = jwt();
        let pipeline = GuardPipeline::standard(jwt.clone());
        let claims = AccessClaims {
            user_id: 1,
            username: "zhangsan".to_string(),
            roles: vec![],
            permissions: vec![],
        };
        let long_ago = chrono::Utc::now().timestamp() - 3600;
        let token = jwt
            .sign_at(
                &claims,
                crate::auth::TokenType::Access,
                chrono::Duration::minutes(30),
                long_ago,
            )
            .unwrap();

        assert_eq!(
            pipeline.run(&RoutePolicy::login(), &headers(&format!("Bearer {token}"))),
            Err(AuthError::InvalidCredential)
        );
    }

    #[test]
    fn test_refresh_token_not_accepted_as_bearer() {
        let jwt = jwt();
        let pipeline = GuardPipeline::standard(jwt.clone());
        let refresh = jwt
            .issue_refresh(&crate::auth::RefreshClaims { user_id: 1 })
            .unwrap();

        assert_eq!(
            pipeline.run(&RoutePolicy::login(), &headers(&format!("Bearer {refresh}"))),
            Err(AuthError::InvalidCredential)
        );
    }

    #[test]
    fn test_permission_checks() {
        let jwt = jwt();
        let pipeline = GuardPipeline::standard(jwt.clone());
        let policy = RoutePolicy::permissions(["ccc"]);

        let user = pipeline
            .run(&policy, &bearer(&jwt, &["ccc", "ddd"]))
            .unwrap()
            .unwrap();
        assert_eq!(user.username, "zhangsan");

        assert_eq!(
            pipeline.run(&policy, &bearer(&jwt, &["ddd"])),
            Err(AuthError::Forbidden("ccc".to_string()))
        );
    }

    #[test]
    fn test_first_missing_permission_reported() {
        let jwt = jwt();
        let pipeline = GuardPipeline::standard(jwt.clone());
        let policy = RoutePolicy::permissions(["ccc", "xxx", "yyy"]);

        assert_eq!(
            pipeline.run(&policy, &bearer(&jwt, &["ccc"])),
            Err(AuthError::Forbidden("xxx".to_string()))
        );
    }

    #[test]
    fn test_login_only_route_needs_no_permissions() {
        let jwt = jwt();
        let pipeline = GuardPipeline::standard(jwt.clone());

        let user = pipeline
            .run(&RoutePolicy::login(), &bearer(&jwt, &[]))
            .unwrap();
        assert!(user.is_some());
    }

    struct Counting(Arc<AtomicUsize>);

    impl GuardStage for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn check<'a>(&self, ctx: RouteContext<'a>) -> Result<RouteContext<'a>, AuthError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(ctx)
        }
    }

    #[test]
    fn test_failure_short_circuits_later_stages() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = GuardPipeline::standard(jwt()).with_stage(Counting(calls.clone()));
        assert_eq!(
            pipeline.stage_names(),
            vec!["authentication", "authorization", "counting"]
        );

        let _ = pipeline.run(&RoutePolicy::login(), &HeaderMap::new());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let _ = pipeline.run(&RoutePolicy::public(), &HeaderMap::new());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
