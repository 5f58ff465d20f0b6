//! Segment Cache Port - 分段音频缓存抽象
//!
//! 以 (段落文本, 话者, 语言) 为键缓存后端合成结果。
//! 缓存本身不产生独立错误，只代理后端的结果。

use async_trait::async_trait;
use serde::Serialize;

/// 缓存 key：精确的字符串三元组，不做任何归一化
/// （段落文本在分段阶段已经 trim 过）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub text: String,
    pub speaker: String,
    pub language: String,
}

impl CacheKey {
    pub fn new(
        text: impl Into<String>,
        speaker: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            speaker: speaker.into(),
            language: language.into(),
        }
    }

    /// key 的 MD5 指纹，用于日志（完整文本太长不适合打日志）
    pub fn fingerprint(&self) -> String {
        let digest = md5::compute(format!("{}:{}:{}", self.text, self.speaker, self.language));
        format!("{:x}", digest)
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub total_bytes: u64,
    pub hit_rate: f64,
}

/// Segment Cache Port
///
/// 并发约束：不同 key 的并发访问互不阻塞；同一 key 在未命中竞态下
/// 允许重复计算（至少一次语义）。
#[async_trait]
pub trait SegmentCachePort: Send + Sync {
    /// 查询缓存，命中时更新访问时间（LRU touch）并计入 hit
    async fn get(&self, key: &CacheKey) -> Option<Vec<u8>>;

    /// 写入缓存，必要时先按 LRU 淘汰到容量以内
    async fn put(&self, key: CacheKey, audio: Vec<u8>);

    /// 获取缓存统计
    fn stats(&self) -> CacheStats;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_exact_equality() {
        let a = CacheKey::new("你好", "zh_male_xiaoming", "zh");
        let b = CacheKey::new("你好", "zh_male_xiaoming", "zh");
        let c = CacheKey::new("你好 ", "zh_male_xiaoming", "zh");
        assert_eq!(a, b);
        assert_ne!(a, c); // 不做归一化，空白也参与比较
    }

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let key = CacheKey::new("text", "spk", "zh");
        let fp = key.fingerprint();
        assert_eq!(fp.len(), 32);
        assert_eq!(fp, key.fingerprint());
    }
}
