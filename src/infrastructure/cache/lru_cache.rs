//! 内存 LRU 段落缓存
//!
//! DashMap 存条目，每条带最后访问时间戳；容量满时线性扫描
//! 淘汰最久未访问的条目。条目数为上限（非字节数）。

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::application::ports::{CacheKey, CacheStats, SegmentCachePort};

struct CacheEntry {
    audio: Arc<Vec<u8>>,
    last_accessed: AtomicI64,
}

fn now_micros() -> i64 {
    chrono::Utc::now().timestamp_micros()
}

/// 段落音频缓存
pub struct LruSegmentCache {
    entries: DashMap<CacheKey, CacheEntry>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LruSegmentCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// 淘汰最久未访问的条目，直到有空位
    fn evict_oldest(&self) {
        while self.entries.len() >= self.capacity {
            let mut oldest: Option<(CacheKey, i64)> = None;
            for entry in self.entries.iter() {
                let accessed = entry.value().last_accessed.load(Ordering::Relaxed);
                match &oldest {
                    Some((_, ts)) if accessed >= *ts => {}
                    _ => oldest = Some((entry.key().clone(), accessed)),
                }
            }
            match oldest {
                Some((key, _)) => {
                    tracing::debug!(key = %key.fingerprint(), "evicting least recently used entry");
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl SegmentCachePort for LruSegmentCache {
    async fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        match self.entries.get(key) {
            Some(entry) => {
                entry
                    .value()
                    .last_accessed
                    .store(now_micros(), Ordering::Relaxed);
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value().audio.as_ref().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    async fn put(&self, key: CacheKey, audio: Vec<u8>) {
        if !self.entries.contains_key(&key) {
            self.evict_oldest();
        }
        self.entries.insert(
            key,
            CacheEntry {
                audio: Arc::new(audio),
                last_accessed: AtomicI64::new(now_micros()),
            },
        );
    }

    fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let total_bytes: u64 = self.entries.iter().map(|e| e.value().audio.len() as u64).sum();
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            hits,
            misses,
            total_bytes,
            hit_rate: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str) -> CacheKey {
        CacheKey::new(text, "zh_male_xiaoming", "zh")
    }

    #[tokio::test]
    async fn test_get_returns_stored_audio_and_counts_hit() {
        let cache = LruSegmentCache::new(10);
        cache.put(key("hello"), vec![1, 2, 3]).await;

        assert_eq!(cache.get(&key("hello")).await, Some(vec![1, 2, 3]));
        assert_eq!(cache.get(&key("absent")).await, None);

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_distinct_voices_are_distinct_entries() {
        let cache = LruSegmentCache::new(10);
        cache
            .put(CacheKey::new("同文", "zh_male_xiaoming", "zh"), vec![1])
            .await;
        cache
            .put(CacheKey::new("同文", "zh_female_qingxin", "zh"), vec![2])
            .await;

        assert_eq!(
            cache.get(&CacheKey::new("同文", "zh_male_xiaoming", "zh")).await,
            Some(vec![1])
        );
        assert_eq!(
            cache.get(&CacheKey::new("同文", "zh_female_qingxin", "zh")).await,
            Some(vec![2])
        );
        assert_eq!(cache.stats().entries, 2);
    }

    #[tokio::test]
    async fn test_eviction_removes_least_recently_accessed() {
        let cache = LruSegmentCache::new(2);
        cache.put(key("a"), vec![b'a']).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        cache.put(key("b"), vec![b'b']).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;

        // 访问 a，使 b 成为最久未用
        assert!(cache.get(&key("a")).await.is_some());
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;

        cache.put(key("c"), vec![b'c']).await;

        assert!(cache.get(&key("a")).await.is_some());
        assert!(cache.get(&key("b")).await.is_none(), "b should be evicted");
        assert!(cache.get(&key("c")).await.is_some());
        assert_eq!(cache.stats().entries, 2);
    }

    #[tokio::test]
    async fn test_overwrite_same_key_keeps_single_entry() {
        let cache = LruSegmentCache::new(2);
        cache.put(key("x"), vec![1]).await;
        cache.put(key("x"), vec![2]).await;

        assert_eq!(cache.get(&key("x")).await, Some(vec![2]));
        assert_eq!(cache.stats().entries, 1);
    }
}
