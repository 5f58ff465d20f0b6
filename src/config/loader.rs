//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOXRELAY_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOXRELAY_SERVER__PORT=8080`
/// - `VOXRELAY_AUTH__API_KEY=sk-xxx`
/// - `VOXRELAY_PIPELINE__MAX_WORKERS=10`
/// - `VOXRELAY_BACKEND__USE_FAKE=true`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5050)?
        .set_default("auth.api_key", "sk-564565KDA231D")?
        .set_default(
            "backend.endpoint",
            "https://translate.volcengine.com/crx/tts/v1/",
        )?
        .set_default("backend.timeout_secs", 10)?
        .set_default("backend.shape_fallback", true)?
        .set_default("backend.use_fake", false)?
        .set_default("pipeline.max_text_length", 500)?
        .set_default("pipeline.max_workers", 5)?
        .set_default("pipeline.stream_chunk_size", 32 * 1024)?
        .set_default("cache.capacity", 200)?
        .set_default("cache.prewarm", true)?
        .set_default("filter.enabled", false)?
        .set_default("filter.use_default_rules", true)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 前缀: VOXRELAY_，层级分隔符: __ (双下划线)
    // 例如: VOXRELAY_BACKEND__TIMEOUT_SECS=30
    builder = builder.add_source(
        Environment::with_prefix("VOXRELAY")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.auth.api_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "API key cannot be empty".to_string(),
        ));
    }

    if !config.backend.use_fake && config.backend.endpoint.is_empty() {
        return Err(ConfigError::ValidationError(
            "Backend endpoint cannot be empty".to_string(),
        ));
    }

    if config.pipeline.max_text_length == 0 {
        return Err(ConfigError::ValidationError(
            "Max text length cannot be 0".to_string(),
        ));
    }

    if config.pipeline.max_workers == 0 {
        return Err(ConfigError::ValidationError(
            "Max workers cannot be 0".to_string(),
        ));
    }

    if config.pipeline.stream_chunk_size == 0 {
        return Err(ConfigError::ValidationError(
            "Stream chunk size cannot be 0".to_string(),
        ));
    }

    if config.cache.capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Cache capacity cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Backend: {}", config.backend.endpoint);
    tracing::info!("Backend Timeout: {}s", config.backend.timeout_secs);
    tracing::info!("Backend Shape Fallback: {}", config.backend.shape_fallback);
    tracing::info!("Backend Fake Mode: {}", config.backend.use_fake);
    tracing::info!("Max Text Length: {}", config.pipeline.max_text_length);
    tracing::info!("Max Workers: {}", config.pipeline.max_workers);
    tracing::info!("Stream Chunk Size: {}", config.pipeline.stream_chunk_size);
    tracing::info!("Cache Capacity: {}", config.cache.capacity);
    tracing::info!("Cache Prewarm: {}", config.cache.prewarm);
    tracing::info!("Text Filter Enabled: {}", config.filter.enabled);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_api_key() {
        let mut config = AppConfig::default();
        config.auth.api_key = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_workers() {
        let mut config = AppConfig::default();
        config.pipeline.max_workers = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_fake_backend_allows_empty_endpoint() {
        let mut config = AppConfig::default();
        config.backend.use_fake = true;
        config.backend.endpoint = String::new();
        assert!(validate_config(&config).is_ok());
    }
}
