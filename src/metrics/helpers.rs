//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{
    CACHE_ENTRIES, CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL, JOBS_FINISHED_TOTAL,
    JOBS_SUBMITTED_TOTAL, QUEUE_DEPTH, RENDER_DURATION_SECONDS, SURFACE_LOADS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording job metrics
pub struct JobMetrics;

impl JobMetrics {
    /// Record a job entering the scheduler
    pub fn record_submitted() {
        JOBS_SUBMITTED_TOTAL.inc();
        QUEUE_DEPTH.inc();
    }

    /// Record a scheduled job leaving the scheduler, after it finished or
    /// when it could not be queued
    pub fn record_settled() {
        QUEUE_DEPTH.dec();
    }

    /// Record a terminal state and how long the job took
    pub fn record_finished(outcome: &str, was_cached: bool, elapsed: Duration) {
        JOBS_FINISHED_TOTAL.with_label_values(&[outcome]).inc();
        let source = if was_cached { "cache" } else { "surface" };
        RENDER_DURATION_SECONDS
            .with_label_values(&[source])
            .observe(elapsed.as_secs_f64());
    }
}

/// Helper struct for recording cache metrics
pub struct CacheMetrics;

impl CacheMetrics {
    pub fn record_hit() {
        CACHE_HITS_TOTAL.inc();
    }

    pub fn record_miss() {
        CACHE_MISSES_TOTAL.inc();
    }

    pub fn entry_added() {
        CACHE_ENTRIES.inc();
    }

    pub fn entries_removed(count: usize) {
        CACHE_ENTRIES.sub(count as i64);
    }
}

/// Helper struct for recording surface metrics
pub struct SurfaceMetrics;

impl SurfaceMetrics {
    pub fn record_load() {
        SURFACE_LOADS_TOTAL.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_recorded_metrics() {
        JobMetrics::record_finished("completed", true, Duration::from_millis(3));
        SurfaceMetrics::record_load();

        let text = encode_metrics().unwrap();
        assert!(text.contains("html_renderer_jobs_finished_total"));
        assert!(text.contains("html_renderer_render_duration_seconds"));
        assert!(text.contains("html_renderer_surface_loads_total"));
    }
}
