//! HTTP Middleware
//!
//! Bearer 鉴权 + 状态码错误日志

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use super::error::ApiError;
use super::state::AppState;

/// Bearer API Key 鉴权中间件
///
/// 校验 `Authorization: Bearer <key>`，缺失或不匹配一律 401
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(key) if key == state.api_key => Ok(next.run(request).await),
        Some(_) => Err(ApiError::Unauthorized("Invalid API key".into())),
        None => Err(ApiError::Unauthorized("API key is required".into())),
    }
}

/// 请求计数中间件
///
/// 对每个请求累计 total，依据响应状态码记成功/失败
pub async fn track_metrics(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    state.metrics.record_request();

    let response = next.run(request).await;
    state
        .metrics
        .record_request_outcome(response.status().is_success());

    response
}

/// HTTP 状态码错误日志中间件
///
/// 拦截 HTTP 响应，当状态码为 4xx 或 5xx 时记录日志
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP client error"
        );
    }

    response
}
