//! 路由策略表
//!
//! 每个路由在注册时同时声明访问策略，启动后只读。
//!
//! ```ignore
//! let routes = PolicyRouter::new()
//!     .get("/user/bbb", handler::bbb, RoutePolicy::public())
//!     .get("/user/info", handler::info, RoutePolicy::login())
//!     .get("/user/aaa", handler::aaa, RoutePolicy::permissions(["ccc"]));
//! let (router, table) = routes.into_parts();
//! ```

use std::collections::HashMap;

use axum::Router;
use axum::handler::Handler;
use axum::routing::{get, post};
use http::Method;

/// 路由访问策略
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoutePolicy {
    /// 是否需要登录
    pub requires_auth: bool,
    /// 需要的权限代码，按声明顺序检查
    pub required_permissions: Vec<String>,
}

static PUBLIC: RoutePolicy = RoutePolicy {
    requires_auth: false,
    required_permissions: Vec::new(),
};

impl RoutePolicy {
    /// 公开路由
    pub fn public() -> Self {
        Self::default()
    }

    /// 仅需登录
    pub fn login() -> Self {
        Self {
            requires_auth: true,
            required_permissions: Vec::new(),
        }
    }

    /// 需要登录并持有全部给定权限
    pub fn permissions<I, P>(codes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            requires_auth: true,
            required_permissions: codes.into_iter().map(Into::into).collect(),
        }
    }
}

/// `(method, path pattern)` → [`RoutePolicy`]
///
/// 未登记的路由视为公开。HEAD 请求沿用同路径 GET 的策略。
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    policies: HashMap<(Method, String), RoutePolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: Method, path: impl Into<String>, policy: RoutePolicy) {
        self.policies.insert((method, path.into()), policy);
    }

    /// 查找策略，`path` 为路由模式 (axum `MatchedPath`)
    pub fn lookup(&self, method: &Method, path: &str) -> &RoutePolicy {
        let key = (method.clone(), path.to_string());
        if let Some(policy) = self.policies.get(&key) {
            return policy;
        }
        if *method == Method::HEAD
            && let Some(policy) = self.policies.get(&(Method::GET, path.to_string()))
        {
            return policy;
        }
        &PUBLIC
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    fn extend(&mut self, other: PolicyTable) {
        self.policies.extend(other.policies);
    }
}

/// 同时登记路由与策略的 Router
pub struct PolicyRouter<S = ()> {
    router: Router<S>,
    table: PolicyTable,
}

impl<S> Default for PolicyRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> PolicyRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            table: PolicyTable::new(),
        }
    }

    /// 登记 GET 路由
    pub fn get<H, T>(mut self, path: &str, handler: H, policy: RoutePolicy) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.router = self.router.route(path, get(handler));
        self.table.insert(Method::GET, path, policy);
        self
    }

    /// 登记 POST 路由
    pub fn post<H, T>(mut self, path: &str, handler: H, policy: RoutePolicy) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.router = self.router.route(path, post(handler));
        self.table.insert(Method::POST, path, policy);
        self
    }

    /// 合并另一组路由及其策略
    pub fn merge(mut self, other: PolicyRouter<S>) -> Self {
        self.router = self.router.merge(other.router);
        self.table.extend(other.table);
        self
    }

    pub fn into_parts(self) -> (Router<S>, PolicyTable) {
        (self.router, self.table)
    }
}
