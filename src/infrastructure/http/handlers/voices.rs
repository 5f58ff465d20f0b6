//! Voice Handlers - 音色列表

use axum::Json;

use crate::domain::voice;
use crate::infrastructure::http::dto::VoicesResponse;

/// GET /v1/voices（以及别名 GET /v1/audio/voices）
pub async fn list_voices() -> Json<VoicesResponse> {
    Json(VoicesResponse::new(voice::all_voices()))
}
