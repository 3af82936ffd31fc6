//! 用户路由
//!
//! | 路径 | 方法 | 策略 |
//! |------|------|------|
//! | /user/login | POST | 公开 |
//! | /user/admin/login | POST | 公开 |
//! | /user/refresh | GET | 公开 |
//! | /user/admin/refresh | GET | 公开 |
//! | /user/register-captcha | GET | 公开 |
//! | /user/register | POST | 公开 |
//! | /user/init-data | GET | 公开 |
//! | /user/info | GET | 登录 |
//! | /user/freeze | GET | 登录 |
//! | /user/aaa | GET | 登录 + `ccc` |
//! | /user/bbb | GET | 公开 |

mod handler;

use crate::auth::{PolicyRouter, RoutePolicy};
use crate::core::ServerState;

pub fn router() -> PolicyRouter<ServerState> {
    PolicyRouter::new()
        // 登录 / 刷新
        .post("/user/login", handler::login, RoutePolicy::public())
        .post("/user/admin/login", handler::admin_login, RoutePolicy::public())
        .get("/user/refresh", handler::refresh, RoutePolicy::public())
        .get("/user/admin/refresh", handler::admin_refresh, RoutePolicy::public())
        // 注册
        .get(
            "/user/register-captcha",
            handler::register_captcha,
            RoutePolicy::public(),
        )
        .post("/user/register", handler::register, RoutePolicy::public())
        .get("/user/init-data", handler::init_data, RoutePolicy::public())
        // 需要登录
        .get("/user/info", handler::info, RoutePolicy::login())
        .get("/user/freeze", handler::freeze, RoutePolicy::login())
        // 权限演示
        .get("/user/aaa", handler::aaa, RoutePolicy::permissions(["ccc"]))
        .get("/user/bbb", handler::bbb, RoutePolicy::public())
}
