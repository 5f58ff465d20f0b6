//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::ports::CacheStats;
use crate::domain::voice::VoiceView;
use crate::infrastructure::metrics::MetricsSnapshot;

// ============================================================================
// Speech DTOs
// ============================================================================

fn default_model() -> String {
    "tts-1".to_string()
}

fn default_voice() -> String {
    crate::domain::voice::DEFAULT_SPEAKER.to_string()
}

fn default_format() -> String {
    "mp3".to_string()
}

fn default_speed() -> f32 {
    1.0
}

/// POST /v1/audio/speech 请求体，兼容 OpenAI 客户端
#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    #[serde(default = "default_model")]
    pub model: String,
    pub input: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_format")]
    pub response_format: String,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default)]
    pub stream: bool,
}

// ============================================================================
// Voice DTOs
// ============================================================================

/// GET /v1/voices 响应，OpenAI list 风格
#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub object: &'static str,
    pub data: Vec<VoiceView>,
}

impl VoicesResponse {
    pub fn new(data: Vec<VoiceView>) -> Self {
        Self {
            object: "list",
            data,
        }
    }
}

// ============================================================================
// Stats / Root DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub uptime_secs: i64,
    pub requests: MetricsSnapshot,
    pub cache: CacheStats,
    pub config: ConfigEcho,
}

/// 生效中的管线参数（便于排查线上表现与配置不一致的问题）
#[derive(Debug, Serialize)]
pub struct ConfigEcho {
    pub max_text_length: usize,
    pub max_workers: usize,
    pub stream_chunk_size: usize,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub endpoints: Vec<&'static str>,
}

impl ServiceInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            status: "ok",
            endpoints: vec![
                "POST /v1/audio/speech",
                "GET /v1/voices",
                "GET /v1/audio/voices",
                "GET /stats",
            ],
        }
    }
}
