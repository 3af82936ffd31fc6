//! User Handlers
//!
//! 登录、刷新、注册和个人信息

use std::time::Duration;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::client::{
    LoginRequest, LoginUserVo, RefreshQuery, RefreshTokenVo, RegisterUserRequest, UserDetailVo,
};

use crate::api::extract::ApiJson;
use crate::auth::{AuthError, CurrentUser};
use crate::cache::Cache;
use crate::core::ServerState;
use crate::db::{NewUser, RepoError, UserStore, seed::seed_demo_data};
use crate::services::{Mail, Mailer};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_email, validate_password, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

/// 注册验证码缓存键前缀
const CAPTCHA_PREFIX: &str = "captcha";
/// 注册验证码有效期
const CAPTCHA_TTL: Duration = Duration::from_secs(5 * 60);

type ApiResult<T> = AppResult<Json<ApiResponse<T>>>;

/// 普通用户登录
pub async fn login(
    State(state): State<ServerState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<LoginUserVo> {
    do_login(&state, req, false).await
}

/// 管理员登录
pub async fn admin_login(
    State(state): State<ServerState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<LoginUserVo> {
    do_login(&state, req, true).await
}

async fn do_login(state: &ServerState, req: LoginRequest, is_admin: bool) -> ApiResult<LoginUserVo> {
    validate_required_text(&req.username, "username", MAX_NAME_LEN)?;
    validate_required_text(&req.password, "password", MAX_PASSWORD_LEN)?;

    let outcome = state
        .issuer
        .login(&req.username, &req.password, is_admin)
        .await?;
    Ok(ok(outcome.into_vo()))
}

/// 刷新令牌 (普通用户)
pub async fn refresh(
    State(state): State<ServerState>,
    Query(query): Query<RefreshQuery>,
) -> ApiResult<RefreshTokenVo> {
    do_refresh(&state, query, false).await
}

/// 刷新令牌 (管理员)
pub async fn admin_refresh(
    State(state): State<ServerState>,
    Query(query): Query<RefreshQuery>,
) -> ApiResult<RefreshTokenVo> {
    do_refresh(&state, query, true).await
}

async fn do_refresh(
    state: &ServerState,
    query: RefreshQuery,
    is_admin: bool,
) -> ApiResult<RefreshTokenVo> {
    let token = query
        .refresh_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::TokenMissing))?;

    let pair = state.issuer.refresh(&token, is_admin).await?;
    Ok(ok(RefreshTokenVo::from(pair)))
}

#[derive(Debug, Deserialize)]
pub struct CaptchaQuery {
    pub address: Option<String>,
}

/// 发送注册验证码
pub async fn register_captcha(
    State(state): State<ServerState>,
    Query(query): Query<CaptchaQuery>,
) -> ApiResult<String> {
    let address = query
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| AppError::with_message(ErrorCode::RequiredField, "请输入邮箱地址"))?;
    validate_email(&address)?;

    let key = captcha_key(&address);
    if state.cache.get(&key).await.is_some() {
        return Err(AppError::new(ErrorCode::CaptchaTooFrequent));
    }

    let code = format!("{:08x}", rand::random::<u32>());
    state
        .cache
        .set(&key, code.clone(), Some(CAPTCHA_TTL))
        .await;

    state
        .mailer
        .send(Mail {
            to: address,
            subject: "会议室预约系统-注册验证码".to_string(),
            html: format!("<p>您的验证码是：{code}，有效期 5 分钟！</p>"),
        })
        .await
        .map_err(|e| AppError::internal(format!("Failed to send captcha mail: {e}")))?;

    Ok(ok("发送成功".to_string()))
}

/// 注册
pub async fn register(
    State(state): State<ServerState>,
    ApiJson(req): ApiJson<RegisterUserRequest>,
) -> ApiResult<String> {
    validate_required_text(&req.username, "username", MAX_NAME_LEN)?;
    validate_required_text(&req.nick_name, "nickName", MAX_NAME_LEN)?;
    validate_password(&req.password)?;
    validate_email(&req.email)?;

    let key = captcha_key(&req.email);
    match state.cache.get(&key).await {
        Some(code) if code == req.captcha => {}
        _ => return Err(AppError::new(ErrorCode::CaptchaInvalid)),
    }

    let user = state
        .store
        .create(NewUser {
            username: req.username,
            password: req.password,
            nick_name: req.nick_name,
            email: req.email,
            phone_number: None,
            is_admin: false,
            role_ids: vec![],
        })
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(msg) => AuthError::DuplicatePrincipal(msg),
            other => AuthError::from(other),
        })?;
    state.cache.remove(&key).await;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok(ok("注册成功".to_string()))
}

/// 写入演示数据
pub async fn init_data(State(state): State<ServerState>) -> ApiResult<String> {
    seed_demo_data(state.store.as_ref())
        .await
        .map_err(AuthError::from)?;
    Ok(ok("done".to_string()))
}

/// 当前用户资料
pub async fn info(State(state): State<ServerState>, user: CurrentUser) -> ApiResult<UserDetailVo> {
    let found = state
        .store
        .find_detail_by_id(user.id)
        .await
        .map_err(AuthError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(ok(found.detail()))
}

#[derive(Debug, Deserialize)]
pub struct FreezeQuery {
    pub id: Option<String>,
}

/// 冻结用户
pub async fn freeze(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<FreezeQuery>,
) -> ApiResult<String> {
    let id: i64 = query
        .id
        .as_deref()
        .and_then(|raw| raw.trim().parse().ok())
        .ok_or_else(|| AppError::validation("id 应该是数字"))?;

    state.store.freeze(id).await.map_err(|e| match e {
        RepoError::NotFound(_) => AppError::new(ErrorCode::UserNotFound),
        other => AppError::from(AuthError::from(other)),
    })?;

    tracing::info!(target_user = id, operator = user.id, "User frozen");
    Ok(ok("冻结用户成功！".to_string()))
}

/// 需要 `ccc` 权限
pub async fn aaa(_user: CurrentUser) -> Json<ApiResponse<&'static str>> {
    ok("aaa")
}

/// 公开
pub async fn bbb() -> Json<ApiResponse<&'static str>> {
    ok("bbb")
}

fn captcha_key(address: &str) -> String {
    format!("{CAPTCHA_PREFIX}_{address}")
}
