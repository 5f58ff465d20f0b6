//! Stats Handler - 运行时指标

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ConfigEcho, StatsResponse};
use crate::infrastructure::http::state::AppState;

/// GET /stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let pipeline_config = state.pipeline.config();
    Json(StatsResponse {
        uptime_secs: state.uptime_secs(),
        requests: state.metrics.snapshot(),
        cache: state.pipeline.cache_stats(),
        config: ConfigEcho {
            max_text_length: pipeline_config.max_text_length,
            max_workers: pipeline_config.max_workers,
            stream_chunk_size: pipeline_config.stream_chunk_size,
        },
    })
}
