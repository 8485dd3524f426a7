//! Metrics collection using metrics-rs.

use metrics::{Unit, counter, histogram};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Whether metrics have been initialized.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

// Metric names as constants for consistency
const PLUGINS_LOADED: &str = "pixview_plugins_loaded";
const PLUGINS_REJECTED: &str = "pixview_plugins_rejected";
const TRANSFORMS_APPLIED: &str = "pixview_transforms_applied";
const TRANSFORMS_FAILED: &str = "pixview_transforms_failed";
const TRANSFORM_TIME_NS: &str = "pixview_transform_time_ns";
const IMAGES_LOADED: &str = "pixview_images_loaded";
const NAVIGATION_BOUNDARIES: &str = "pixview_navigation_boundaries";

/// Initialize metrics descriptions.
///
/// Call this once at application startup before using any metrics.
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    metrics::describe_counter!(
        PLUGINS_LOADED,
        Unit::Count,
        "Plugin transforms registered during discovery"
    );
    metrics::describe_counter!(
        PLUGINS_REJECTED,
        Unit::Count,
        "Plugin candidates skipped during discovery"
    );
    metrics::describe_counter!(
        TRANSFORMS_APPLIED,
        Unit::Count,
        "Transforms whose output replaced the current image"
    );
    metrics::describe_counter!(
        TRANSFORMS_FAILED,
        Unit::Count,
        "Transforms that failed or broke their contract"
    );
    metrics::describe_histogram!(
        TRANSFORM_TIME_NS,
        Unit::Nanoseconds,
        "Time to apply a single transform"
    );
    metrics::describe_counter!(IMAGES_LOADED, Unit::Count, "Images decoded into a session");
    metrics::describe_counter!(
        NAVIGATION_BOUNDARIES,
        Unit::Count,
        "Navigation requests that hit a boundary"
    );
}

/// Record a plugin transform registered.
#[inline]
pub fn record_plugin_loaded() {
    counter!(PLUGINS_LOADED).increment(1);
}

/// Record a plugin candidate skipped.
#[inline]
pub fn record_plugin_rejected() {
    counter!(PLUGINS_REJECTED).increment(1);
}

/// Record a transform that replaced the current image.
#[inline]
pub fn record_transform_applied(transform: &str, duration: Duration) {
    counter!(TRANSFORMS_APPLIED, "transform" => transform.to_string()).increment(1);
    histogram!(TRANSFORM_TIME_NS, "transform" => transform.to_string())
        .record(duration.as_nanos() as f64);
}

/// Record a transform that failed.
#[inline]
pub fn record_transform_failed(transform: &str) {
    counter!(TRANSFORMS_FAILED, "transform" => transform.to_string()).increment(1);
}

/// Record an image decoded into a session.
#[inline]
pub fn record_image_loaded() {
    counter!(IMAGES_LOADED).increment(1);
}

/// Record a navigation request that hit a boundary.
#[inline]
pub fn record_navigation_boundary(signal: &'static str) {
    counter!(NAVIGATION_BOUNDARIES, "signal" => signal).increment(1);
}

/// Measures how long a transform takes.
pub struct TransformTimer {
    start: Instant,
}

impl TransformTimer {
    /// Start timing.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time elapsed since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
