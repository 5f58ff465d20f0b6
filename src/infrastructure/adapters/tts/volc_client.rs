//! 火山引擎翻译 TTS 客户端
//!
//! 实现 TtsBackendPort trait，调用火山引擎翻译页的非公开 TTS 接口
//!
//! 外部 API:
//! POST https://translate.volcengine.com/crx/tts/v1/
//! Request: {"text": "...", "speaker": "...", "language": "..."}  (JSON)
//!   或旧格式 {"type": "Json", "payload": {...}}
//! Response: {"audio": {"data": "<base64 mp3>"}} 或 {"audio": "<base64 mp3>"}

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{BackendError, SynthesisRequest, TtsBackendPort};

/// 请求体格式。接口历史上接受过两种，新格式优先
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestShape {
    Flat {
        text: String,
        speaker: String,
        language: String,
    },
    Wrapped {
        #[serde(rename = "type")]
        kind: &'static str,
        payload: WrappedPayload,
    },
}

#[derive(Debug, Serialize)]
struct WrappedPayload {
    text: String,
    speaker: String,
    language: String,
}

impl RequestShape {
    fn all(request: &SynthesisRequest) -> Vec<RequestShape> {
        vec![
            RequestShape::Flat {
                text: request.text.clone(),
                speaker: request.speaker.clone(),
                language: request.language.clone(),
            },
            RequestShape::Wrapped {
                kind: "Json",
                payload: WrappedPayload {
                    text: request.text.clone(),
                    speaker: request.speaker.clone(),
                    language: request.language.clone(),
                },
            },
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            RequestShape::Flat { .. } => "flat",
            RequestShape::Wrapped { .. } => "wrapped",
        }
    }
}

/// 接口响应。audio 字段有两种历史形态
#[derive(Debug, Deserialize)]
struct TtsResponse {
    audio: Option<AudioPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AudioPayload {
    Nested { data: String },
    Direct(String),
}

impl AudioPayload {
    fn base64_data(&self) -> &str {
        match self {
            AudioPayload::Nested { data } => data,
            AudioPayload::Direct(data) => data,
        }
    }
}

/// 火山 TTS 客户端配置
#[derive(Debug, Clone)]
pub struct VolcTtsConfig {
    /// TTS 接口完整 URL
    pub endpoint: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 首选格式失败时是否回退到旧格式
    pub shape_fallback: bool,
}

impl Default for VolcTtsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.volcengine.com/crx/tts/v1/".to_string(),
            timeout_secs: 10,
            shape_fallback: true,
        }
    }
}

impl VolcTtsConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

// 有效 MP3 要么有 ID3 标签，要么以帧同步字节开头。
// 小于该长度的"音频"视为接口返回的残次品
const MIN_PLAUSIBLE_MP3: usize = 64;

// MPEG-1 Layer III, 32kbps, 44.1kHz, mono 的静音帧头
const SILENT_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x10, 0xC4];
const SILENT_FRAME_LEN: usize = 104;

fn silent_frame() -> Vec<u8> {
    let mut frame = vec![0u8; SILENT_FRAME_LEN];
    frame[..4].copy_from_slice(&SILENT_FRAME_HEADER);
    frame
}

fn has_mp3_marker(data: &[u8]) -> bool {
    if data.starts_with(b"ID3") {
        return true;
    }
    data.len() >= 2 && data[0] == 0xFF && (data[1] & 0xE0) == 0xE0
}

/// 修补接口偶发返回的畸形 MP3，保证下游播放器不中断
fn normalize_audio(data: Vec<u8>) -> Vec<u8> {
    if data.len() < MIN_PLAUSIBLE_MP3 {
        tracing::warn!(
            bytes = data.len(),
            "audio payload too small, substituting silent frame"
        );
        return silent_frame();
    }
    if !has_mp3_marker(&data) {
        tracing::warn!(
            bytes = data.len(),
            "audio payload missing mp3 marker, wrapping with frame header"
        );
        let mut repaired = SILENT_FRAME_HEADER.to_vec();
        repaired.extend_from_slice(&data);
        repaired.extend_from_slice(&silent_frame());
        return repaired;
    }
    data
}

/// 火山引擎 TTS 客户端
///
/// 伪装成浏览器翻译插件的请求，接口才会放行
pub struct VolcTtsClient {
    client: Client,
    config: VolcTtsConfig,
}

impl VolcTtsClient {
    pub fn new(config: VolcTtsConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn with_default_config() -> Result<Self, BackendError> {
        Self::new(VolcTtsConfig::default())
    }

    /// 单次请求：发送一种格式的请求体并解析音频
    async fn try_shape(&self, shape: &RequestShape) -> Result<Vec<u8>, BackendError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("authority", "translate.volcengine.com")
            .header("origin", "chrome-extension://klgfhbdadaspgppeadghjjemk")
            .header("accept", "application/json, text/plain, */*")
            .header("sec-fetch-dest", "empty")
            .header("sec-fetch-mode", "cors")
            .header("sec-fetch-site", "none")
            .header("cookie", "hasUserBehavior=1")
            .header(
                "user-agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/106.0.0.0 Safari/537.36",
            )
            .json(shape)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else if e.is_connect() {
                    BackendError::Network(format!("cannot connect to TTS endpoint: {}", e))
                } else {
                    BackendError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TtsResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("malformed response body: {}", e)))?;

        let audio = parsed
            .audio
            .ok_or_else(|| BackendError::InvalidResponse("response has no audio field".into()))?;

        let decoded = BASE64
            .decode(audio.base64_data())
            .map_err(|e| BackendError::InvalidResponse(format!("invalid base64 audio: {}", e)))?;

        Ok(normalize_audio(decoded))
    }
}

#[async_trait]
impl TtsBackendPort for VolcTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, BackendError> {
        if request.text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let shapes = RequestShape::all(&request);
        let shapes: &[RequestShape] = if self.config.shape_fallback {
            &shapes
        } else {
            &shapes[..1]
        };

        tracing::debug!(
            text_len = request.text.chars().count(),
            speaker = %request.speaker,
            language = %request.language,
            "sending TTS request"
        );

        let mut last_error = BackendError::InvalidResponse("no request shape attempted".into());
        for shape in shapes {
            match self.try_shape(shape).await {
                Ok(audio) => {
                    tracing::info!(
                        shape = shape.name(),
                        audio_size = audio.len(),
                        "TTS synthesis completed"
                    );
                    return Ok(audio);
                }
                Err(e @ BackendError::InvalidResponse(_)) => {
                    // 接口收下了请求但响应残缺，换格式也无济于事
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(shape = shape.name(), error = %e, "request shape rejected");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}
