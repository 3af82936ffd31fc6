//! Request body extractors

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::utils::AppError;

/// JSON 请求体
///
/// 与 [`axum::Json`] 相同，但解析失败时返回统一的 `{code, message, data}` 错误体
/// (400 参数校验失败)，而不是纯文本 422。
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "Rejected request body");
            AppError::validation(rejection.body_text())
        })?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{StatusCode, header};
    use serde::Deserialize;
    use shared::ErrorCode;

    #[derive(Debug, Deserialize)]
    struct Credentials {
        username: String,
        password: String,
    }

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let mut builder = http::Request::post("/user/login");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let req = request(
            Some("application/json"),
            r#"{"username":"zhangsan","password":"111111"}"#,
        );
        let ApiJson(creds) = ApiJson::<Credentials>::from_request(req, &()).await.unwrap();
        assert_eq!(creds.username, "zhangsan");
        assert_eq!(creds.password, "111111");
    }

    #[tokio::test]
    async fn test_bad_bodies_become_validation_errors() {
        let cases = [
            (Some("application/json"), r#"{"username":"zhangsan"}"#),
            (Some("application/json"), "{not json"),
            (None, r#"{"username":"zhangsan","password":"111111"}"#),
        ];

        for (content_type, body) in cases {
            let err = ApiJson::<Credentials>::from_request(request(content_type, body), &())
                .await
                .err()
                .unwrap();
            assert_eq!(err.code, ErrorCode::ValidationFailed);
            assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        }
    }
}
