//! Application State
//!
//! HTTP 层共享的应用状态：管线、文本过滤器、指标、鉴权密钥

use std::sync::Arc;

use crate::application::pipeline::SynthesisPipeline;
use crate::domain::TextFilter;
use crate::infrastructure::metrics::PerfMetrics;

/// 应用状态
pub struct AppState {
    pub pipeline: Arc<SynthesisPipeline>,
    pub text_filter: TextFilter,
    pub metrics: Arc<PerfMetrics>,
    /// Bearer 鉴权密钥
    pub api_key: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        pipeline: Arc<SynthesisPipeline>,
        text_filter: TextFilter,
        metrics: Arc<PerfMetrics>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            pipeline,
            text_filter,
            metrics,
            api_key: api_key.into(),
            started_at: chrono::Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}
