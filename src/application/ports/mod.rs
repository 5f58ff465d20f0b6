//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod segment_cache;
mod tts_backend;

pub use segment_cache::{CacheKey, CacheStats, SegmentCachePort};
pub use tts_backend::{BackendError, SynthesisRequest, TtsBackendPort};
