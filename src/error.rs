//! Error types for pixview.

use crate::plugin::PluginError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using pixview's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pixview operations.
///
/// Every variant describes an operation that did not happen; none of them
/// leaves a session half-updated.
#[derive(Error, Debug)]
pub enum Error {
    /// The codec could not parse the image bytes.
    #[error("failed to decode {}: {reason}", path.display())]
    Decode {
        /// File that was being decoded.
        path: PathBuf,
        /// Codec message.
        reason: String,
    },

    /// The codec could not produce the requested file format.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// The target filename does not carry a supported image extension.
    #[error("unsupported image format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// An editing operation was requested before any image was loaded.
    #[error("no image is loaded")]
    NoCurrentImage,

    /// No built-in or plugin transform is registered under this name.
    #[error("unknown transform '{0}'")]
    UnknownTransform(String),

    /// A transform returned a buffer whose shape differs from its input.
    #[error(
        "transform '{name}' broke its contract: expected {expected_width}x{expected_height} \
         (stride {expected_stride}), got {width}x{height} (stride {stride})"
    )]
    TransformContractViolation {
        /// Transform name.
        name: String,
        /// Input width.
        expected_width: usize,
        /// Input height.
        expected_height: usize,
        /// Input stride.
        expected_stride: usize,
        /// Reported output width.
        width: usize,
        /// Reported output height.
        height: usize,
        /// Reported output stride.
        stride: usize,
    },

    /// A plugin transform reported failure through its status code.
    #[error("transform '{name}' failed with status {status}")]
    TransformFailed {
        /// Transform name.
        name: String,
        /// Non-zero status returned by the module.
        status: i32,
    },

    /// Pixel buffer dimensions and storage disagree.
    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    /// Plugin loading error.
    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
