//! Prometheus metrics for the renderer.
//!
//! This module provides metrics for monitoring rendering:
//! - Job metrics (submitted, finished by outcome, duration by source)
//! - Queue metrics (jobs queued or running)
//! - Cache metrics (hits, misses, entries)
//! - Surface metrics (markup loads)

mod helpers;

pub use helpers::{encode_metrics, CacheMetrics, JobMetrics, SurfaceMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    HistogramVec, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "html_renderer";

lazy_static! {
    // ============================================================================
    // Job Metrics
    // ============================================================================

    /// Total render jobs handed to the scheduler
    pub static ref JOBS_SUBMITTED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_jobs_submitted_total", METRIC_PREFIX),
        "Total render jobs submitted to the scheduler"
    ).unwrap();

    /// Total finished jobs by terminal state
    pub static ref JOBS_FINISHED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_jobs_finished_total", METRIC_PREFIX),
        "Total render jobs that reached a terminal state",
        &["outcome"]
    ).unwrap();

    /// Render duration by result source
    pub static ref RENDER_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        format!("{}_render_duration_seconds", METRIC_PREFIX),
        "Wall-clock duration of render jobs",
        &["source"],
        vec![0.001, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    ).unwrap();

    /// Jobs queued or running
    pub static ref QUEUE_DEPTH: IntGauge = register_int_gauge!(
        format!("{}_queue_depth", METRIC_PREFIX),
        "Number of render jobs queued or running"
    ).unwrap();

    // ============================================================================
    // Cache Metrics
    // ============================================================================

    pub static ref CACHE_HITS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_cache_hits_total", METRIC_PREFIX),
        "Total result cache hits"
    ).unwrap();

    pub static ref CACHE_MISSES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_cache_misses_total", METRIC_PREFIX),
        "Total result cache misses"
    ).unwrap();

    pub static ref CACHE_ENTRIES: IntGauge = register_int_gauge!(
        format!("{}_cache_entries", METRIC_PREFIX),
        "Number of rendered images held in the result cache"
    ).unwrap();

    // ============================================================================
    // Surface Metrics
    // ============================================================================

    pub static ref SURFACE_LOADS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_surface_loads_total", METRIC_PREFIX),
        "Total markup loads issued to the rendering surface"
    ).unwrap();
}
