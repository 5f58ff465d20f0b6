//! Speech Handler - 语音合成入口

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::domain::voice;
use crate::infrastructure::http::dto::SpeechRequest;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// POST /v1/audio/speech
///
/// 非流式：整段音频一次返回，附带处理耗时和分段数头。
/// 流式：分段边合成边下发，单段失败跳过不断流。
pub async fn create_speech(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeechRequest>,
) -> Result<Response, ApiError> {
    tracing::info!(
        voice = %req.voice,
        model = %req.model,
        input_len = req.input.chars().count(),
        stream = req.stream,
        "speech request received"
    );

    if req.response_format != "mp3" {
        // 后端只产 MP3，其他格式照常返回 MP3 字节
        tracing::warn!(format = %req.response_format, "unsupported response_format, serving mp3");
    }

    let text = state.text_filter.filter(&req.input);
    let selector = voice::resolve(&req.voice);

    if req.stream {
        state.metrics.record_stream_request();
        let stream = state.pipeline.clone().synthesize_stream(text, selector);

        return Ok(Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "audio/mpeg")
            .header(
                header::CONTENT_DISPOSITION,
                "attachment; filename=speech.mp3",
            )
            .body(Body::from_stream(stream))
            .map_err(|e| ApiError::Internal(e.to_string()))?);
    }

    let result = state.pipeline.synthesize_buffered(&text, &selector).await;
    let cache = state.pipeline.cache_stats();

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/mp3")
        .header(header::CONTENT_LENGTH, result.data.len())
        .header("X-Process-Time", format!("{:.3}", result.elapsed.as_secs_f64()))
        .header("X-Segments-Count", result.segment_count)
        .header(
            "X-Cache-Info",
            format!(
                "hits={}, misses={}, entries={}, capacity={}",
                cache.hits, cache.misses, cache.entries, cache.capacity
            ),
        )
        .body(Body::from(result.data))
        .map_err(|e| ApiError::Internal(e.to_string()))?)
}
