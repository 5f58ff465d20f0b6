//! Fake TTS 后端 - 用于本地开发和测试
//!
//! 不实际调用火山接口，返回固定的静音 MP3 帧

use async_trait::async_trait;

use crate::application::ports::{BackendError, SynthesisRequest, TtsBackendPort};

/// Fake 后端配置
#[derive(Debug, Clone)]
pub struct FakeBackendConfig {
    /// 模拟的合成延迟（毫秒）
    pub latency_ms: u64,
    /// 每段返回的帧重复次数，控制输出大小
    pub frame_repeat: usize,
}

impl Default for FakeBackendConfig {
    fn default() -> Self {
        Self {
            latency_ms: 50,
            frame_repeat: 4,
        }
    }
}

// 与真实后端修补用的静音帧一致的 MPEG-1 Layer III 帧
const SILENT_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x10, 0xC4];
const SILENT_FRAME_LEN: usize = 104;

/// Fake TTS 后端
///
/// 离线开发时替代火山接口
pub struct FakeBackend {
    config: FakeBackendConfig,
    audio: Vec<u8>,
}

impl FakeBackend {
    pub fn new(config: FakeBackendConfig) -> Self {
        let mut audio = Vec::with_capacity(SILENT_FRAME_LEN * config.frame_repeat);
        for _ in 0..config.frame_repeat {
            let mut frame = vec![0u8; SILENT_FRAME_LEN];
            frame[..4].copy_from_slice(&SILENT_FRAME_HEADER);
            audio.extend_from_slice(&frame);
        }
        tracing::info!(
            latency_ms = config.latency_ms,
            audio_size = audio.len(),
            "FakeBackend initialized"
        );
        Self { config, audio }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeBackendConfig::default())
    }
}

#[async_trait]
impl TtsBackendPort for FakeBackend {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, BackendError> {
        tracing::debug!(
            text_len = request.text.chars().count(),
            speaker = %request.speaker,
            "FakeBackend: returning canned audio"
        );

        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        Ok(self.audio.clone())
    }
}
