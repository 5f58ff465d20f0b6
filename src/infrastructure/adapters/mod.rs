//! 外部服务适配器

pub mod tts;
