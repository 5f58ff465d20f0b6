//! Cached Synthesizer - 带缓存的单段合成
//!
//! 包装 TTS 后端：先查分段缓存，未命中再调后端并回填。
//! 同一 key 的并发未命中允许重复调用后端（至少一次语义）。

use std::sync::Arc;

use crate::application::ports::{
    BackendError, CacheKey, SegmentCachePort, SynthesisRequest, TtsBackendPort,
};
use crate::domain::VoiceSelector;
use crate::infrastructure::metrics::PerfMetrics;

/// 预热短语：启动时跑一遍缓存，首个真实请求不必承担完整后端延迟
const PREWARM_PHRASES: &[&str] = &["你好", "谢谢", "欢迎使用"];

/// 带缓存的合成器
#[derive(Clone)]
pub struct CachedSynthesizer {
    cache: Arc<dyn SegmentCachePort>,
    backend: Arc<dyn TtsBackendPort>,
    metrics: Arc<PerfMetrics>,
}

impl CachedSynthesizer {
    pub fn new(
        cache: Arc<dyn SegmentCachePort>,
        backend: Arc<dyn TtsBackendPort>,
        metrics: Arc<PerfMetrics>,
    ) -> Self {
        Self {
            cache,
            backend,
            metrics,
        }
    }

    /// 获取单个段落的音频（缓存优先）
    ///
    /// 空结果（后端对空文本的短路返回）不进缓存
    pub async fn get_or_synthesize(
        &self,
        text: &str,
        voice: &VoiceSelector,
    ) -> Result<Vec<u8>, BackendError> {
        let key = CacheKey::new(text, &voice.speaker, &voice.language);

        if let Some(audio) = self.cache.get(&key).await {
            tracing::debug!(key = %key.fingerprint(), bytes = audio.len(), "segment cache hit");
            return Ok(audio);
        }

        let request = SynthesisRequest::new(text, voice);
        let started = std::time::Instant::now();
        let audio = match self.backend.synthesize(request).await {
            Ok(audio) => {
                self.metrics.record_synthesis(started.elapsed());
                audio
            }
            Err(e) => {
                self.metrics.record_synthesis_failure();
                return Err(e);
            }
        };

        if !audio.is_empty() {
            self.cache.put(key, audio.clone()).await;
        }

        Ok(audio)
    }

    /// 服务预热
    ///
    /// 用常见短语填充缓存；单条失败只记日志，不中断预热也不影响启动
    pub async fn prewarm(&self) {
        let voice = VoiceSelector::default();
        for phrase in PREWARM_PHRASES {
            match self.get_or_synthesize(phrase, &voice).await {
                Ok(audio) => {
                    tracing::info!(phrase, bytes = audio.len(), "service prewarmed with phrase");
                }
                Err(e) => {
                    tracing::warn!(phrase, error = %e, "error during prewarming");
                }
            }
        }
    }

    pub fn cache_stats(&self) -> crate::application::ports::CacheStats {
        self.cache.stats()
    }

    pub fn metrics(&self) -> &Arc<PerfMetrics> {
        &self.metrics
    }
}
