//! 合成管线
//!
//! 核心流程：分段 → 并发取段音频（经缓存） → 组装。
//! 两种输出模式：
//! - buffered: 等全部段落完成后拼成单个音频
//! - streaming: 逐段解析，切成固定大小的片即时产出
//!
//! 单个段落失败降级为空音频，绝不让整个请求失败。

mod synthesizer;

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures_util::Stream;
use tokio::sync::Semaphore;

use crate::application::ports::{CacheStats, SegmentCachePort, TtsBackendPort};
use crate::domain::{segmenter, VoiceSelector};
use crate::infrastructure::metrics::PerfMetrics;

pub use synthesizer::CachedSynthesizer;

/// 管线配置
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 每段最大字符数
    pub max_text_length: usize,
    /// 最大并发后端调用数
    pub max_workers: usize,
    /// 流式输出的分片大小（字节）
    pub stream_chunk_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_text_length: segmenter::DEFAULT_MAX_CHARS,
            max_workers: 5,
            stream_chunk_size: 32 * 1024,
        }
    }
}

/// buffered 模式的输出
#[derive(Debug)]
pub struct BufferedAudio {
    /// 按段落顺序拼接的音频字节
    pub data: Vec<u8>,
    /// 分段数
    pub segment_count: usize,
    /// 整个管线耗时
    pub elapsed: Duration,
}

/// 合成管线
pub struct SynthesisPipeline {
    synth: CachedSynthesizer,
    config: PipelineConfig,
}

impl SynthesisPipeline {
    pub fn new(
        cache: Arc<dyn SegmentCachePort>,
        backend: Arc<dyn TtsBackendPort>,
        metrics: Arc<PerfMetrics>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            synth: CachedSynthesizer::new(cache, backend, metrics),
            config,
        }
    }

    /// 并发处理一批段落，结果与输入按下标对齐
    ///
    /// 并发度 = min(段落数, max_workers)，用 Semaphore 限流。
    /// 失败的段落在原位置留下空字节，不影响其他段落。
    pub async fn process_segments(
        &self,
        segments: &[String],
        voice: &VoiceSelector,
    ) -> Vec<Vec<u8>> {
        if segments.is_empty() {
            return Vec::new();
        }

        let workers = segments.len().min(self.config.max_workers);
        let semaphore = Arc::new(Semaphore::new(workers));

        let mut handles = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            let semaphore = semaphore.clone();
            let synth = self.synth.clone();
            let segment = segment.clone();
            let voice = voice.clone();

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return Vec::new(), // semaphore 已关闭，不会发生
                };

                match synth.get_or_synthesize(&segment, &voice).await {
                    Ok(audio) => audio,
                    Err(e) => {
                        tracing::error!(
                            segment_index = index,
                            segment_len = segment.chars().count(),
                            error = %e,
                            "segment synthesis failed, substituting empty audio"
                        );
                        Vec::new()
                    }
                }
            }));
        }

        // 按提交顺序收集，完成顺序不影响输出顺序
        let mut results = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(audio) => results.push(audio),
                Err(e) => {
                    tracing::error!(segment_index = index, error = %e, "segment task panicked");
                    results.push(Vec::new());
                }
            }
        }
        results
    }

    /// buffered 模式：分段、并发合成、按序拼接
    pub async fn synthesize_buffered(&self, text: &str, voice: &VoiceSelector) -> BufferedAudio {
        let started = Instant::now();

        let segments = segmenter::split(text, self.config.max_text_length);
        tracing::info!(segments = segments.len(), "text split into segments");

        if segments.len() > 1 {
            self.synth.metrics().record_parallel_request();
        }

        let audio_segments = self.process_segments(&segments, voice).await;

        let total: usize = audio_segments.iter().map(Vec::len).sum();
        let mut data = Vec::with_capacity(total);
        for audio in &audio_segments {
            data.extend_from_slice(audio);
        }

        self.synth.metrics().record_audio_bytes(data.len());

        let elapsed = started.elapsed();
        tracing::info!(
            bytes = data.len(),
            segments = segments.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "complete audio assembled"
        );

        BufferedAudio {
            data,
            segment_count: segments.len(),
            elapsed,
        }
    }

    /// streaming 模式：逐段解析（顺序即可，调用方增量消费），
    /// 每段音频再切成 stream_chunk_size 大小的片即时产出。
    ///
    /// 段落合成失败只记日志并跳过，流继续输出后续段落。
    pub fn synthesize_stream(
        self: Arc<Self>,
        text: String,
        voice: VoiceSelector,
    ) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
        async_stream::stream! {
            let segments = segmenter::split(&text, self.config.max_text_length);
            tracing::info!(segments = segments.len(), "streaming synthesis started");

            for (index, segment) in segments.iter().enumerate() {
                match self.synth.get_or_synthesize(segment, &voice).await {
                    Ok(audio) => {
                        self.synth.metrics().record_audio_bytes(audio.len());
                        for piece in audio.chunks(self.config.stream_chunk_size) {
                            yield Ok(Bytes::copy_from_slice(piece));
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            segment_index = index,
                            error = %e,
                            "segment synthesis failed mid-stream, skipping"
                        );
                    }
                }
            }
        }
    }

    /// 启动预热（失败非致命）
    pub async fn prewarm(&self) {
        self.synth.prewarm().await;
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.synth.cache_stats()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures_util::StreamExt;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::application::ports::{BackendError, SynthesisRequest};
    use crate::infrastructure::cache::LruSegmentCache;

    /// 可编排的测试后端：按文本指定返回、失败或延迟
    #[derive(Default)]
    struct ScriptedBackend {
        /// text -> (延迟毫秒, 结果)
        script: HashMap<String, (u64, Result<Vec<u8>, String>)>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new() -> Self {
            Self::default()
        }

        fn ok(mut self, text: &str, delay_ms: u64, audio: &[u8]) -> Self {
            self.script
                .insert(text.to_string(), (delay_ms, Ok(audio.to_vec())));
            self
        }

        fn fail(mut self, text: &str) -> Self {
            self.script
                .insert(text.to_string(), (0, Err("scripted failure".to_string())));
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TtsBackendPort for ScriptedBackend {
        async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script.get(&request.text) {
                Some((delay_ms, result)) => {
                    if *delay_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                    }
                    result
                        .clone()
                        .map_err(|e| BackendError::Network(e))
                }
                None => Ok(format!("audio:{}", request.text).into_bytes()),
            }
        }
    }

    fn pipeline_with(backend: Arc<dyn TtsBackendPort>, config: PipelineConfig) -> Arc<SynthesisPipeline> {
        let cache: Arc<dyn SegmentCachePort> = Arc::new(LruSegmentCache::new(64));
        let metrics = Arc::new(PerfMetrics::new());
        Arc::new(SynthesisPipeline::new(cache, backend, metrics, config))
    }

    fn segments(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_results_index_aligned_under_reversed_completion_order() {
        // 第一段最慢、最后一段最快，完成顺序与提交顺序相反
        let backend = Arc::new(
            ScriptedBackend::new()
                .ok("seg-a", 120, b"AAA")
                .ok("seg-b", 60, b"BBB")
                .ok("seg-c", 0, b"CCC"),
        );
        let pipeline = pipeline_with(backend, PipelineConfig::default());

        let results = pipeline
            .process_segments(&segments(&["seg-a", "seg-b", "seg-c"]), &VoiceSelector::default())
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], b"AAA");
        assert_eq!(results[1], b"BBB");
        assert_eq!(results[2], b"CCC");
    }

    #[tokio::test]
    async fn test_single_failure_leaves_empty_slot() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .ok("one", 0, b"111")
                .fail("two")
                .ok("three", 0, b"333"),
        );
        let pipeline = pipeline_with(backend, PipelineConfig::default());

        let results = pipeline
            .process_segments(&segments(&["one", "two", "three"]), &VoiceSelector::default())
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], b"111");
        assert!(results[1].is_empty());
        assert_eq!(results[2], b"333");
    }

    #[tokio::test]
    async fn test_worker_limit_respects_config() {
        // 并发度受 max_workers 限制：10 个各 50ms 的段落，单 worker
        // 必须串行执行，总耗时明显超过单段耗时
        let mut backend = ScriptedBackend::new();
        let mut texts = Vec::new();
        for i in 0..4 {
            let text = format!("w{}", i);
            backend = backend.ok(&text, 50, b"x");
            texts.push(text);
        }
        let config = PipelineConfig {
            max_workers: 1,
            ..Default::default()
        };
        let pipeline = pipeline_with(Arc::new(backend), config);

        let started = Instant::now();
        let results = pipeline
            .process_segments(&texts, &VoiceSelector::default())
            .await;
        assert_eq!(results.len(), 4);
        assert!(
            started.elapsed() >= Duration::from_millis(180),
            "single worker should serialize execution"
        );
    }

    #[tokio::test]
    async fn test_buffered_concatenates_in_order_skipping_empty() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .ok("alpha.", 30, b"AA")
                .fail("beta.")
                .ok("gamma.", 0, b"GG"),
        );
        let config = PipelineConfig {
            max_text_length: 7,
            ..Default::default()
        };
        let pipeline = pipeline_with(backend, config);

        // "alpha. beta. gamma." 按句号分为三段
        let result = pipeline
            .synthesize_buffered("alpha. beta. gamma.", &VoiceSelector::default())
            .await;

        assert_eq!(result.segment_count, 3);
        assert_eq!(result.data, b"AAGG");
    }

    #[tokio::test]
    async fn test_buffered_empty_input_yields_empty_audio() {
        let backend = Arc::new(ScriptedBackend::new());
        let pipeline = pipeline_with(backend, PipelineConfig::default());

        let result = pipeline
            .synthesize_buffered("", &VoiceSelector::default())
            .await;
        assert_eq!(result.segment_count, 0);
        assert!(result.data.is_empty());
    }

    #[tokio::test]
    async fn test_cache_deduplicates_repeated_segments() {
        let backend = Arc::new(ScriptedBackend::new().ok("repeat", 0, b"R"));
        let backend_ref = backend.clone();
        let pipeline = pipeline_with(backend, PipelineConfig::default());

        let voice = VoiceSelector::default();
        let first = pipeline.process_segments(&segments(&["repeat"]), &voice).await;
        let second = pipeline.process_segments(&segments(&["repeat"]), &voice).await;

        assert_eq!(first, second);
        assert_eq!(backend_ref.call_count(), 1, "second lookup must hit the cache");
    }

    #[tokio::test]
    async fn test_stream_skips_failed_segment_and_continues() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .ok("first.", 0, b"FF")
                .fail("second.")
                .ok("third.", 0, b"TT"),
        );
        let config = PipelineConfig {
            max_text_length: 7,
            ..Default::default()
        };
        let pipeline = pipeline_with(backend, config);

        let stream = pipeline.synthesize_stream(
            "first. second. third.".to_string(),
            VoiceSelector::default(),
        );
        futures_util::pin_mut!(stream);

        let mut collected = Vec::new();
        while let Some(piece) = stream.next().await {
            collected.extend_from_slice(&piece.unwrap());
        }

        // 第二段失败被跳过，其余按序输出，流未中断
        assert_eq!(collected, b"FFTT");
    }

    #[tokio::test]
    async fn test_stream_reslices_audio_into_fixed_pieces() {
        let audio = vec![7u8; 70];
        let backend = Arc::new(ScriptedBackend::new().ok("chunked", 0, &audio));
        let config = PipelineConfig {
            stream_chunk_size: 32,
            ..Default::default()
        };
        let pipeline = pipeline_with(backend, config);

        let stream =
            pipeline.synthesize_stream("chunked".to_string(), VoiceSelector::default());
        futures_util::pin_mut!(stream);

        let mut sizes = Vec::new();
        while let Some(piece) = stream.next().await {
            sizes.push(piece.unwrap().len());
        }
        assert_eq!(sizes, vec![32, 32, 6]);
    }
}
