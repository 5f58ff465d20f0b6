//! TTS Backend Port - 外部 TTS 服务抽象
//!
//! 定义单段文本合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::VoiceSelector;

/// 后端合成错误
///
/// 只描述单个段落的失败；调用方（管线）负责把失败段落降级为空音频
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Backend returned HTTP {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 单段合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 要合成的文本（单个段落）
    pub text: String,
    /// 后端话者 ID
    pub speaker: String,
    /// 后端语言码
    pub language: String,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, voice: &VoiceSelector) -> Self {
        Self {
            text: text.into(),
            speaker: voice.speaker.clone(),
            language: voice.language.clone(),
        }
    }
}

/// TTS Backend Port
///
/// 每次调用对应一次逻辑合成请求；空文本直接返回空字节，不发起网络调用
#[async_trait]
pub trait TtsBackendPort: Send + Sync {
    /// 合成单个文本段落，返回编码后的音频字节
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, BackendError>;
}
