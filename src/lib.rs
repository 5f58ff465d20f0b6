//! Voxrelay - 分段式 TTS 请求代理
//!
//! 接收 OpenAI 格式的语音合成请求，转换为火山引擎 TTS 的请求格式，
//! 返回合成音频（整段或流式）。
//!
//! 领域层 (domain/):
//! - Segmenter: 长文本分段
//! - TextFilter: 编辑性内容过滤（引用资料、思考过程等）
//! - Voice: 静态音色表与音色解析
//!
//! 应用层 (application/):
//! - Ports: 端口定义（TtsBackend, SegmentCache）
//! - Pipeline: 核心合成管线（分段 → 并发合成 → 组装/流式输出）
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API（OpenAI 兼容）
//! - Adapters: 火山引擎 TTS 客户端
//! - Cache: 内存 LRU 分段缓存
//! - Metrics: 进程级性能计数器

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
