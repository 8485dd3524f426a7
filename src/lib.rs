//! # Pixview
//!
//! Core of a directory image viewer/editor whose transforms can be supplied
//! by independently compiled plugins.
//!
//! Pixview keeps one image in memory at a time, applies built-in or plugin
//! transforms to it, and moves between the images of its directory in a
//! deterministic order.
//!
//! ## Features
//!
//! - **Strided RGB24 buffers**: rows may carry padding, every transform reads through `stride`
//! - **Plugin transforms**: C-ABI descriptors loaded with `libloading`, validated after load
//! - **Host-side contract checks**: plugin output shape is re-checked on every call
//! - **Directory navigation**: sorted png/bmp/jpg siblings, recomputed on each request
//! - **All-or-nothing edits**: failed loads and transforms leave the session untouched
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pixview::prelude::*;
//! use std::sync::Arc;
//!
//! // SAFETY: plugins in this directory are trusted.
//! let registry = unsafe { PluginRegistry::discover("plugins") };
//! let mut session = EditorSession::new(Arc::new(registry));
//!
//! session.load("photos/b.png")?;
//! session.apply_transform("Blur")?;
//! if let Navigation::Boundary(notice) = session.go_to_previous()? {
//!     println!("{notice}");
//! }
//! session.save("photos/b-blurred.jpg")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod listing;
pub mod navigation;
pub mod observability;
pub mod plugin;
pub mod session;
pub mod transform;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::buffer::{PixelBuffer, PixelView, PixelViewMut};
    pub use crate::codec::{ImageCodec, ImageCrateCodec};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::format::{ImageFormat, PixelFormat};
    pub use crate::navigation::{Boundary, NavigationIndex, Neighbor};
    pub use crate::plugin::{PluginLoader, PluginRegistry, PluginTransform};
    pub use crate::session::{EditorSession, ImageStatus, Navigation};
    pub use crate::transform::{BoxBlur, BuiltinTransforms, Transform};
}

pub use error::{Error, Result};
