//! Voxrelay - OpenAI 兼容的 TTS 代理服务
//!
//! 把 OpenAI speech 请求翻译成火山引擎翻译页的 TTS 接口调用：
//! - Domain: 切分、过滤、音色解析
//! - Application: 合成管线与端口
//! - Infrastructure: http, cache, adapters, metrics

use std::sync::Arc;

use voxrelay::application::pipeline::{PipelineConfig, SynthesisPipeline};
use voxrelay::application::ports::{SegmentCachePort, TtsBackendPort};
use voxrelay::config::{load_config, print_config};
use voxrelay::domain::TextFilter;
use voxrelay::infrastructure::adapters::tts::{FakeBackend, VolcTtsClient, VolcTtsConfig};
use voxrelay::infrastructure::cache::LruSegmentCache;
use voxrelay::infrastructure::http::{AppState, HttpServer};
use voxrelay::infrastructure::metrics::PerfMetrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},voxrelay={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));
    if config.log.json {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("Voxrelay - OpenAI 兼容 TTS 代理");
    print_config(&config);

    // 创建 TTS 后端
    let backend: Arc<dyn TtsBackendPort> = if config.backend.use_fake {
        tracing::warn!("Using fake TTS backend, no real synthesis will happen");
        Arc::new(FakeBackend::with_defaults())
    } else {
        let backend_config = VolcTtsConfig {
            endpoint: config.backend.endpoint.clone(),
            timeout_secs: config.backend.timeout_secs,
            shape_fallback: config.backend.shape_fallback,
        };
        Arc::new(VolcTtsClient::new(backend_config)?)
    };

    // 创建段落缓存与指标
    let cache: Arc<dyn SegmentCachePort> = Arc::new(LruSegmentCache::new(config.cache.capacity));
    let metrics = Arc::new(PerfMetrics::new());

    // 创建合成管线
    let pipeline_config = PipelineConfig {
        max_text_length: config.pipeline.max_text_length,
        max_workers: config.pipeline.max_workers,
        stream_chunk_size: config.pipeline.stream_chunk_size,
    };
    let pipeline = Arc::new(SynthesisPipeline::new(
        cache,
        backend,
        metrics.clone(),
        pipeline_config,
    ));

    // 缓存预热（后台进行，失败非致命）
    if config.cache.prewarm {
        let pipeline = pipeline.clone();
        tokio::spawn(async move {
            pipeline.prewarm().await;
        });
    }

    // 文本过滤器
    let text_filter = TextFilter::from_config(&config.filter);

    // 创建 HTTP 服务器
    let state = AppState::new(pipeline, text_filter, metrics, &config.auth.api_key);
    let server = HttpServer::new(&config.server.host, config.server.port, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
