//! Tracing integration for structured logging and spans.

use std::path::Path;
use tracing::{Level, Span, span};

/// Create a span for plugin discovery in `dir`.
///
/// # Example
///
/// ```rust,ignore
/// use pixview::observability::span_discovery;
///
/// let _guard = span_discovery(Path::new("plugins")).entered();
/// // Discovery here...
/// ```
#[inline]
pub fn span_discovery(dir: &Path) -> Span {
    span!(Level::INFO, "discovery", dir = %dir.display())
}

/// Create a span for one transform application.
#[inline]
pub fn span_transform(transform: &str, width: usize, height: usize) -> Span {
    span!(
        Level::DEBUG,
        "transform",
        transform = %transform,
        width = width,
        height = height
    )
}

/// Create a span for loading an image.
#[inline]
pub fn span_load(path: &Path) -> Span {
    span!(Level::DEBUG, "load", path = %path.display())
}

/// Log a transform error.
#[inline]
pub fn trace_transform_error(transform: &str, error: &dyn std::error::Error) {
    tracing::error!(
        transform = %transform,
        error = %error,
        "transform rejected"
    );
}
