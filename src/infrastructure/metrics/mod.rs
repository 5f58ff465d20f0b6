//! 性能计数器
//!
//! 进程级只增计数器，贯穿整个进程生命周期。
//! 通过 `Arc<PerfMetrics>` 注入，测试中可替换为请求级实例。

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// 性能计数器
#[derive(Debug, Default)]
pub struct PerfMetrics {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    stream_requests: AtomicU64,
    parallel_requests: AtomicU64,
    synth_calls: AtomicU64,
    synth_failures: AtomicU64,
    synth_latency_ms_total: AtomicU64,
    total_audio_bytes: AtomicU64,
}

/// 计数器快照（/stats 输出）
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub stream_requests: u64,
    pub parallel_requests: u64,
    pub synth_calls: u64,
    pub synth_failures: u64,
    pub avg_synth_latency_ms: f64,
    pub total_audio_bytes: u64,
}

impl PerfMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_outcome(&self, success: bool) {
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_stream_request(&self) {
        self.stream_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parallel_request(&self) {
        self.parallel_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录一次成功的后端合成调用
    pub fn record_synthesis(&self, latency: Duration) {
        self.synth_calls.fetch_add(1, Ordering::Relaxed);
        self.synth_latency_ms_total
            .fetch_add(latency.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_synthesis_failure(&self) {
        self.synth_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_audio_bytes(&self, bytes: usize) {
        self.total_audio_bytes
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// 平均合成延迟（毫秒），由累计值推导
    pub fn avg_synth_latency_ms(&self) -> f64 {
        let calls = self.synth_calls.load(Ordering::Relaxed);
        if calls == 0 {
            return 0.0;
        }
        self.synth_latency_ms_total.load(Ordering::Relaxed) as f64 / calls as f64
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            stream_requests: self.stream_requests.load(Ordering::Relaxed),
            parallel_requests: self.parallel_requests.load(Ordering::Relaxed),
            synth_calls: self.synth_calls.load(Ordering::Relaxed),
            synth_failures: self.synth_failures.load(Ordering::Relaxed),
            avg_synth_latency_ms: self.avg_synth_latency_ms(),
            total_audio_bytes: self.total_audio_bytes.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = PerfMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_request_outcome(true);
        metrics.record_request_outcome(false);
        metrics.record_audio_bytes(1024);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.successful_requests, 1);
        assert_eq!(snapshot.failed_requests, 1);
        assert_eq!(snapshot.total_audio_bytes, 1024);
    }

    #[test]
    fn test_avg_latency_derived_from_totals() {
        let metrics = PerfMetrics::new();
        assert_eq!(metrics.avg_synth_latency_ms(), 0.0);

        metrics.record_synthesis(Duration::from_millis(100));
        metrics.record_synthesis(Duration::from_millis(300));
        assert_eq!(metrics.avg_synth_latency_ms(), 200.0);
    }
}
