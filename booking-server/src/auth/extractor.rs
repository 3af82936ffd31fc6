//! CurrentUser Extractor

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::CurrentUser;
use crate::utils::AppError;

/// 从请求扩展中取出守卫链放入的当前用户
///
/// 只能用在需要登录的路由上；公开路由没有当前用户，会返回未登录。
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(AppError::not_authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;

    #[tokio::test]
    async fn test_extracts_from_extensions() {
        let user = CurrentUser {
            id: 1,
            username: "zhangsan".to_string(),
            roles: vec![],
            permissions: vec!["ccc".to_string()],
        };
        let mut req = Request::new(());
        req.extensions_mut().insert(user.clone());
        let (mut parts, _) = req.into_parts();

        let extracted = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, user);
    }

    #[tokio::test]
    async fn test_missing_user_is_not_authenticated() {
        let (mut parts, _) = Request::new(()).into_parts();
        let err = CurrentUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.code, shared::ErrorCode::NotAuthenticated);
    }
}
