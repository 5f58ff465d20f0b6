//! 领域层
//!
//! 纯逻辑，不依赖基础设施：文本分段、文本过滤、音色解析

pub mod segmenter;
pub mod text_filter;
pub mod voice;

pub use text_filter::TextFilter;
pub use voice::VoiceSelector;
