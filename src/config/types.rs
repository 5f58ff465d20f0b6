//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 鉴权配置
    #[serde(default)]
    pub auth: AuthConfig,

    /// TTS 后端配置
    #[serde(default)]
    pub backend: BackendConfig,

    /// 合成管线配置
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// 缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 文本过滤配置
    #[serde(default)]
    pub filter: FilterConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5050
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 鉴权配置
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Bearer API Key
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

fn default_api_key() -> String {
    "sk-564565KDA231D".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
        }
    }
}

/// TTS 后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// TTS 接口完整 URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,

    /// 首选请求格式失败时回退旧格式
    #[serde(default = "default_shape_fallback")]
    pub shape_fallback: bool,

    /// 使用离线 Fake 后端（本地开发）
    #[serde(default)]
    pub use_fake: bool,
}

fn default_endpoint() -> String {
    "https://translate.volcengine.com/crx/tts/v1/".to_string()
}

fn default_backend_timeout() -> u64 {
    10
}

fn default_shape_fallback() -> bool {
    true
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_backend_timeout(),
            shape_fallback: default_shape_fallback(),
            use_fake: false,
        }
    }
}

/// 合成管线配置
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// 每段最大字符数
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// 最大并发后端调用数
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// 流式输出分片大小（字节）
    #[serde(default = "default_stream_chunk_size")]
    pub stream_chunk_size: usize,
}

fn default_max_text_length() -> usize {
    500
}

fn default_max_workers() -> usize {
    5
}

fn default_stream_chunk_size() -> usize {
    32 * 1024
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_text_length: default_max_text_length(),
            max_workers: default_max_workers(),
            stream_chunk_size: default_stream_chunk_size(),
        }
    }
}

/// 缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// 缓存条目上限
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// 启动时用常用短语预热缓存
    #[serde(default = "default_prewarm")]
    pub prewarm: bool,
}

fn default_cache_capacity() -> usize {
    200
}

fn default_prewarm() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            prewarm: default_prewarm(),
        }
    }
}

/// 文本过滤配置
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// 是否启用过滤
    #[serde(default)]
    pub enabled: bool,

    /// 是否启用内置规则集
    #[serde(default = "default_use_default_rules")]
    pub use_default_rules: bool,

    /// 自定义规则
    #[serde(default)]
    pub custom_rules: Vec<CustomRuleConfig>,
}

fn default_use_default_rules() -> bool {
    true
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            use_default_rules: default_use_default_rules(),
            custom_rules: Vec::new(),
        }
    }
}

/// 自定义过滤规则
#[derive(Debug, Clone, Deserialize)]
pub struct CustomRuleConfig {
    /// 规则名（日志用）
    pub name: String,

    /// 匹配模式
    pub pattern: String,

    /// pattern 是否为正则，false 时按字面量匹配
    #[serde(default)]
    pub is_regex: bool,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5050);
        assert_eq!(
            config.backend.endpoint,
            "https://translate.volcengine.com/crx/tts/v1/"
        );
        assert_eq!(config.pipeline.max_text_length, 500);
        assert_eq!(config.cache.capacity, 200);
        assert!(!config.filter.enabled);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5050");
    }

    #[test]
    fn test_log_json_flag_deserializes() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "log": {"level": "debug", "json": true}
        }))
        .unwrap();
        assert!(config.log.json);
        assert_eq!(config.log.level, "debug");

        let config = AppConfig::default();
        assert!(!config.log.json);
    }
}
