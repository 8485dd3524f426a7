//! Plugin system for dynamically loading transforms.
//!
//! Transforms can be loaded at runtime from shared libraries found in a
//! plugin directory. The plugin ABI is kept minimal and C-compatible so that
//! host and plugins can be compiled independently.
//!
//! # Plugin Structure
//!
//! A plugin is a shared library (.so on Linux) that exports a single symbol:
//!
//! ```c
//! const TransformDescriptor* pixview_transform_descriptor();
//! ```
//!
//! The descriptor carries the transform name and an `apply` function that
//! reads a [`RawImage`] and writes a host-allocated [`RawImageMut`] of the
//! same shape.
//!
//! # Example Plugin (Rust)
//!
//! ```ignore
//! use pixview::buffer::{PixelView, PixelViewMut};
//!
//! fn identity(input: &PixelView<'_>, output: &mut PixelViewMut<'_>) -> Result<(), String> {
//!     for y in 0..input.height() {
//!         output.row_mut(y).copy_from_slice(input.row(y));
//!     }
//!     Ok(())
//! }
//!
//! pixview::define_transform_plugin! {
//!     name: "Identity",
//!     description: "Copies the image unchanged",
//!     apply: identity,
//! }
//! ```

mod descriptor;
mod loader;
mod registry;

pub use descriptor::{
    ApplyFn, ENTRY_POINT, PIXVIEW_ABI_VERSION, RawImage, RawImageMut, STATUS_BAD_INPUT,
    STATUS_OK, STATUS_PANICKED, TransformDescriptor,
};
pub use loader::{PluginError, PluginLoader, PluginTransform};
pub use registry::{DiagnosticKind, PluginDiagnostic, PluginRegistry};
