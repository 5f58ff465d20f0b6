//! HTTP Routes
//!
//! API Endpoints:
//! - /                    GET   服务信息
//! - /v1/audio/speech     POST  语音合成（需 Bearer 鉴权）
//! - /v1/voices           GET   音色列表
//! - /v1/audio/voices     GET   音色列表别名（兼容旧客户端）
//! - /stats               GET   运行时指标（需 Bearer 鉴权）

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::middleware::require_api_key;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/v1/audio/speech", post(handlers::create_speech))
        .route("/stats", get(handlers::get_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let public = Router::new()
        .route("/", get(handlers::service_info))
        .route("/v1/voices", get(handlers::list_voices))
        .route("/v1/audio/voices", get(handlers::list_voices));

    public.merge(protected).with_state(state)
}
