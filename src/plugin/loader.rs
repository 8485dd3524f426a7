//! Dynamic plugin loading using libloading.

use super::descriptor::{
    ApplyFn, ENTRY_POINT, PIXVIEW_ABI_VERSION, RawImage, RawImageMut, STATUS_OK,
    TransformDescriptor,
};
use crate::buffer::{PixelBuffer, PixelView};
use crate::error::{Error, Result};
use crate::listing::{DirectoryListing, FsListing, has_extension};
use crate::transform::Transform;
use libloading::{Library, Symbol};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur when loading plugins.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// Failed to load the shared library.
    #[error("failed to load library: {0}")]
    LoadFailed(String),

    /// The plugin doesn't have the required entry point.
    #[error("missing plugin entry point: pixview_transform_descriptor")]
    MissingEntryPoint,

    /// The plugin returned a null descriptor.
    #[error("plugin returned null descriptor")]
    NullDescriptor,

    /// ABI version mismatch.
    #[error("ABI version mismatch: expected {expected}, got {actual}")]
    AbiMismatch {
        /// Expected ABI version.
        expected: u32,
        /// Actual ABI version found.
        actual: u32,
    },

    /// Plugin descriptor validation failed.
    #[error("invalid plugin descriptor: {0}")]
    InvalidDescriptor(&'static str),
}

/// Type of the plugin entry point function.
type PluginEntryPoint = unsafe extern "C" fn() -> *const TransformDescriptor;

/// A transform supplied by a plugin.
///
/// Holds a reference to the shared library to keep it loaded. When the last
/// transform from a library is dropped, the library is unloaded.
pub struct PluginTransform {
    /// The loaded library (kept alive). `None` for statically linked descriptors.
    _library: Option<Arc<Library>>,
    apply: ApplyFn,
    name: String,
    description: String,
    origin: PathBuf,
}

impl PluginTransform {
    /// Wrap a descriptor that is linked into the current binary.
    ///
    /// # Safety
    ///
    /// `descriptor` must be null or point to a descriptor whose pointers
    /// stay valid for the rest of the program, and whose `apply` function
    /// honors the [`ApplyFn`] contract.
    pub unsafe fn from_static(
        descriptor: *const TransformDescriptor,
        origin: impl Into<PathBuf>,
    ) -> std::result::Result<Self, PluginError> {
        // SAFETY: Forwarded from the caller.
        unsafe { Self::from_descriptor(None, descriptor, origin.into()) }
    }

    /// Validate `descriptor` and copy out everything the host needs.
    ///
    /// # Safety
    ///
    /// `descriptor` must be null or valid for as long as `library` is loaded.
    unsafe fn from_descriptor(
        library: Option<Arc<Library>>,
        descriptor: *const TransformDescriptor,
        origin: PathBuf,
    ) -> std::result::Result<Self, PluginError> {
        if descriptor.is_null() {
            return Err(PluginError::NullDescriptor);
        }

        // SAFETY: Dereferencing the descriptor pointer. Entry point returned non-null.
        let desc = unsafe { &*descriptor };
        if desc.abi_version != PIXVIEW_ABI_VERSION {
            return Err(PluginError::AbiMismatch {
                expected: PIXVIEW_ABI_VERSION,
                actual: desc.abi_version,
            });
        }

        // SAFETY: Validating the descriptor. Caller guarantees it is properly formed.
        unsafe { desc.validate() }.map_err(PluginError::InvalidDescriptor)?;

        let apply = desc
            .apply
            .ok_or(PluginError::InvalidDescriptor("transform has no apply function"))?;

        // SAFETY: validate() checked both strings.
        let (name, description) = unsafe {
            (
                desc.name_str().unwrap_or_default().to_string(),
                desc.description_str().to_string(),
            )
        };

        Ok(Self {
            _library: library,
            apply,
            name,
            description,
            origin,
        })
    }

    /// Human readable description supplied by the plugin.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// File the transform was loaded from.
    pub fn origin(&self) -> &Path {
        &self.origin
    }
}

impl Transform for PluginTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, input: &PixelView<'_>) -> Result<PixelBuffer> {
        let expected = input.shape();
        let mut output = PixelBuffer::zeroed_like(expected)?;

        let raw_input = RawImage::from_view(input);
        let mut raw_output = RawImageMut::from_buffer(&mut output);

        // SAFETY: Both images describe live, non-overlapping host storage
        // that outlives the call. The library is kept alive by `_library`.
        let status = unsafe { (self.apply)(&raw_input, &mut raw_output) };
        if status != STATUS_OK {
            return Err(Error::TransformFailed {
                name: self.name.clone(),
                status,
            });
        }

        let (width, height, stride, format) = raw_output.reported_shape();
        if (width, height, stride, format)
            != (
                expected.width,
                expected.height,
                expected.stride,
                expected.format as u32,
            )
        {
            return Err(Error::TransformContractViolation {
                name: self.name.clone(),
                expected_width: expected.width,
                expected_height: expected.height,
                expected_stride: expected.stride,
                width,
                height,
                stride,
            });
        }

        Ok(output)
    }
}

impl std::fmt::Debug for PluginTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginTransform")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("dynamic", &self._library.is_some())
            .finish()
    }
}

/// Plugin loader for dynamically loading transforms from shared libraries.
pub struct PluginLoader<L = FsListing> {
    listing: L,
    extension: String,
}

impl PluginLoader<FsListing> {
    /// Create a loader for the platform's shared library extension.
    pub fn new() -> Self {
        Self::with_listing(FsListing)
    }
}

impl<L: DirectoryListing> PluginLoader<L> {
    /// Create a loader that enumerates directories through `listing`.
    pub fn with_listing(listing: L) -> Self {
        Self {
            listing,
            extension: std::env::consts::DLL_EXTENSION.to_string(),
        }
    }

    /// Extension (without dot) a file must carry to be considered a module.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Module candidates in `dir`, sorted by file name ascending.
    ///
    /// A missing or unreadable directory yields no candidates.
    pub fn candidates(&self, dir: &Path) -> Vec<PathBuf> {
        let mut names = match self.listing.list_files(dir) {
            Ok(names) => names,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "plugin directory not readable");
                return Vec::new();
            }
        };
        names.retain(|name| has_extension(name, &self.extension));
        names.sort();
        names.into_iter().map(|name| dir.join(name)).collect()
    }

    /// Load a transform from a specific path.
    ///
    /// # Safety
    ///
    /// Loading plugins is inherently unsafe because we're executing
    /// arbitrary code from shared libraries. The plugin must:
    /// - Export a valid `pixview_transform_descriptor` function
    /// - Return a valid, static transform descriptor
    /// - Implement `apply` according to the [`ApplyFn`] contract
    pub unsafe fn load_from_path(
        &self,
        path: impl AsRef<Path>,
    ) -> std::result::Result<PluginTransform, PluginError> {
        let path = path.as_ref();

        // SAFETY: Loading a dynamic library. Caller ensures the library is trusted.
        let library =
            unsafe { Library::new(path).map_err(|e| PluginError::LoadFailed(e.to_string()))? };

        let descriptor = {
            // SAFETY: Getting a symbol from the library. Library was just loaded successfully.
            let entry_point: Symbol<PluginEntryPoint> = unsafe {
                library
                    .get(ENTRY_POINT)
                    .map_err(|_| PluginError::MissingEntryPoint)?
            };
            // SAFETY: Calling the entry point function. Caller guarantees plugin is valid.
            unsafe { entry_point() }
        };

        // SAFETY: The descriptor lives in the library, which the transform keeps alive.
        unsafe { PluginTransform::from_descriptor(Some(Arc::new(library)), descriptor, path.to_path_buf()) }
    }
}

impl Default for PluginLoader<FsListing> {
    fn default() -> Self {
        Self::new()
    }
}
