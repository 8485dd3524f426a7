//! Observability features: metrics and tracing.
//!
//! - **Metrics**: Counters and histograms via `metrics-rs`
//! - **Tracing**: Structured logging and spans via `tracing`
//!
//! ## Metrics
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `pixview_plugins_loaded` | Counter | Plugin transforms registered |
//! | `pixview_plugins_rejected` | Counter | Plugin candidates skipped |
//! | `pixview_transforms_applied` | Counter | Transforms accepted into the session |
//! | `pixview_transforms_failed` | Counter | Transforms that failed or broke their contract |
//! | `pixview_transform_time_ns` | Histogram | Time per transform |
//! | `pixview_images_loaded` | Counter | Images decoded |
//! | `pixview_navigation_boundaries` | Counter | Navigation requests hitting a boundary |
//!
//! Without an installed recorder every metric call is a no-op.

mod metrics;
mod tracing_support;

pub use self::metrics::{
    TransformTimer, init_metrics, record_image_loaded, record_navigation_boundary,
    record_plugin_loaded, record_plugin_rejected, record_transform_applied,
    record_transform_failed,
};
pub use tracing_support::{span_discovery, span_load, span_transform, trace_transform_error};
