//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// 统一错误响应格式，对齐 OpenAI 风格的 error 对象
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ErrorResponse {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                kind: kind.into(),
            },
        }
    }
}

/// API 错误
///
/// 后端合成失败在管线内部降级为空音频，不会到达这一层；
/// 这里只覆盖请求级失败（鉴权、响应构建）。
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, msg) = match self {
            ApiError::Unauthorized(msg) => {
                tracing::warn!(error = %msg, "Unauthorized");
                (StatusCode::UNAUTHORIZED, "authentication_error", msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        (status, Json(ErrorResponse::new(kind, msg))).into_response()
    }
}
