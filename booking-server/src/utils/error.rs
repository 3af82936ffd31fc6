//! 统一错误处理
//!
//! 错误类型与响应信封都来自 `shared`，这里只补充 handler 用的构造函数。
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::new(ErrorCode::UserNotFound))
//!
//! // 返回成功响应
//! Ok(ok(data))
//! ```

use axum::Json;
use serde::Serialize;

pub use shared::error::{AppError, AppResult, ErrorCode};
pub use shared::response::ApiResponse;

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let Json(body) = ok("aaa");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "code": 200, "message": "success", "data": "aaa" })
        );
    }
}
