//! Transform descriptor and raw image views for the C-compatible ABI.
//!
//! These types define the whole ABI surface a plugin must implement. Images
//! cross the boundary as a read-only [`RawImage`] and a host-allocated
//! [`RawImageMut`]; the plugin never sees host storage it could write past.

use crate::buffer::{PixelBuffer, PixelView, PixelViewMut, Shape};
use crate::format::PixelFormat;
use std::ffi::{CStr, c_char, c_int};

/// Current ABI version. Plugins must match this version to be loaded.
pub const PIXVIEW_ABI_VERSION: u32 = 1;

/// Name of the symbol every plugin exports.
pub const ENTRY_POINT: &[u8] = b"pixview_transform_descriptor\0";

/// Status returned by [`ApplyFn`] on success.
pub const STATUS_OK: c_int = 0;

/// Status returned when the plugin rejects its input.
pub const STATUS_BAD_INPUT: c_int = 1;

/// Status returned when the plugin panicked.
pub const STATUS_PANICKED: c_int = 2;

/// Read-only image handed to a plugin.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawImage {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Bytes between row starts.
    pub stride: usize,
    /// [`PixelFormat`] discriminant.
    pub format: u32,
    /// First byte of pixel data.
    pub data: *const u8,
    /// Number of bytes behind `data`.
    pub len: usize,
}

/// Host-allocated output image a plugin writes into.
///
/// The host fills in the shape before the call and re-validates it after:
/// a plugin that rewrites `width`, `height` or `stride` has broken the
/// non-resizing contract.
#[repr(C)]
#[derive(Debug)]
pub struct RawImageMut {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Bytes between row starts.
    pub stride: usize,
    /// [`PixelFormat`] discriminant.
    pub format: u32,
    /// First byte of writable pixel data.
    pub data: *mut u8,
    /// Number of bytes behind `data`.
    pub len: usize,
}

impl RawImage {
    /// Describe a borrowed view. The result must not outlive `view`.
    pub fn from_view(view: &PixelView<'_>) -> Self {
        let bytes = view.as_bytes();
        Self {
            width: view.width(),
            height: view.height(),
            stride: view.stride(),
            format: view.shape().format as u32,
            data: bytes.as_ptr(),
            len: bytes.len(),
        }
    }

    /// Reborrow as a safe view, validating the shape.
    ///
    /// # Safety
    ///
    /// `data` must point to `len` readable bytes that stay valid for `'a`.
    pub unsafe fn as_view<'a>(&self) -> Option<PixelView<'a>> {
        if self.data.is_null() {
            return None;
        }
        let format = PixelFormat::from_raw(self.format)?;
        // SAFETY: Caller guarantees `data` points to `len` valid bytes.
        let bytes = unsafe { std::slice::from_raw_parts(self.data, self.len) };
        let shape = Shape {
            width: self.width,
            height: self.height,
            stride: self.stride,
            format,
        };
        PixelView::new(shape, bytes).ok()
    }
}

impl RawImageMut {
    /// Describe a host buffer for a plugin to fill.
    ///
    /// The result must not outlive `buffer`, and `buffer` must not be
    /// accessed while the plugin holds the pointer.
    pub fn from_buffer(buffer: &mut PixelBuffer) -> Self {
        let shape = buffer.shape();
        let bytes = buffer.as_bytes_mut();
        Self {
            width: shape.width,
            height: shape.height,
            stride: shape.stride,
            format: shape.format as u32,
            data: bytes.as_mut_ptr(),
            len: bytes.len(),
        }
    }

    /// Reborrow as a safe writable view, validating the shape.
    ///
    /// # Safety
    ///
    /// `data` must point to `len` writable bytes, valid and unaliased for `'a`.
    pub unsafe fn as_view_mut<'a>(&mut self) -> Option<PixelViewMut<'a>> {
        if self.data.is_null() {
            return None;
        }
        let format = PixelFormat::from_raw(self.format)?;
        // SAFETY: Caller guarantees `data` points to `len` writable bytes.
        let bytes = unsafe { std::slice::from_raw_parts_mut(self.data, self.len) };
        let shape = Shape {
            width: self.width,
            height: self.height,
            stride: self.stride,
            format,
        };
        PixelViewMut::new(shape, bytes).ok()
    }

    /// Shape as currently reported by the struct fields.
    pub fn reported_shape(&self) -> (usize, usize, usize, u32) {
        (self.width, self.height, self.stride, self.format)
    }
}

/// Function pointer type for applying a plugin transform.
///
/// Returns [`STATUS_OK`] on success, any other value on failure.
///
/// # Safety
///
/// `input` must describe valid readable memory, `output` valid writable
/// memory that does not overlap `input`.
pub type ApplyFn = unsafe extern "C" fn(input: *const RawImage, output: *mut RawImageMut) -> c_int;

/// Descriptor returned by `pixview_transform_descriptor()`.
///
/// This struct is `#[repr(C)]` for C ABI compatibility.
#[repr(C)]
pub struct TransformDescriptor {
    /// ABI version - must match [`PIXVIEW_ABI_VERSION`].
    pub abi_version: u32,
    /// Null-terminated transform name, used as its identifier.
    pub name: *const c_char,
    /// Null-terminated description (may be null).
    pub description: *const c_char,
    /// Transform entry point.
    pub apply: Option<ApplyFn>,
}

// SAFETY: TransformDescriptor contains only raw pointers to static data
// and function pointers, which are inherently Send + Sync.
unsafe impl Send for TransformDescriptor {}
unsafe impl Sync for TransformDescriptor {}

impl TransformDescriptor {
    /// Get the name as a Rust string.
    ///
    /// # Safety
    ///
    /// `name` must be null or valid and null-terminated.
    pub unsafe fn name_str(&self) -> Option<&str> {
        if self.name.is_null() {
            return None;
        }
        // SAFETY: Caller guarantees `name` is valid and null-terminated.
        unsafe { CStr::from_ptr(self.name).to_str().ok() }
    }

    /// Get the description as a Rust string.
    ///
    /// # Safety
    ///
    /// `description` must be null or valid and null-terminated.
    pub unsafe fn description_str(&self) -> &str {
        if self.description.is_null() {
            return "";
        }
        // SAFETY: Caller guarantees `description` is valid and null-terminated.
        unsafe { CStr::from_ptr(self.description).to_str().unwrap_or("") }
    }

    /// Check that this descriptor satisfies the transform contract.
    ///
    /// # Safety
    ///
    /// All pointer fields must be null or valid.
    pub unsafe fn validate(&self) -> Result<(), &'static str> {
        if self.abi_version != PIXVIEW_ABI_VERSION {
            return Err("ABI version mismatch");
        }
        if self.name.is_null() {
            return Err("transform name is null");
        }
        // SAFETY: We're in an unsafe fn, caller guarantees validity.
        if unsafe { self.name_str() }.is_none() {
            return Err("transform name is not valid UTF-8");
        }
        if self.apply.is_none() {
            return Err("transform has no apply function");
        }
        Ok(())
    }
}

/// Helper macro for defining a transform plugin in Rust.
///
/// The `apply` function receives a read-only input view and a writable
/// output view of the same shape. Returning `Err` or panicking is reported
/// to the host as a non-zero status.
///
/// # Example
///
/// ```ignore
/// use pixview::buffer::{PixelView, PixelViewMut};
///
/// fn invert(input: &PixelView<'_>, output: &mut PixelViewMut<'_>) -> Result<(), String> {
///     for y in 0..input.height() {
///         let src = input.row(y);
///         for (dst, src) in output.row_mut(y).iter_mut().zip(src) {
///             *dst = 255 - src;
///         }
///     }
///     Ok(())
/// }
///
/// pixview::define_transform_plugin! {
///     name: "Invert",
///     description: "Inverts every channel",
///     apply: invert,
/// }
/// ```
#[macro_export]
macro_rules! define_transform_plugin {
    (
        name: $name:literal,
        description: $desc:literal,
        apply: $apply:path $(,)?
    ) => {
        static TRANSFORM_NAME: &[u8] = concat!($name, "\0").as_bytes();
        static TRANSFORM_DESC: &[u8] = concat!($desc, "\0").as_bytes();

        unsafe extern "C" fn __pixview_apply(
            input: *const $crate::plugin::RawImage,
            output: *mut $crate::plugin::RawImageMut,
        ) -> std::ffi::c_int {
            if input.is_null() || output.is_null() {
                return $crate::plugin::STATUS_BAD_INPUT;
            }
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                // SAFETY: The host passes valid, non-overlapping images that
                // outlive this call.
                let (input, mut output) = unsafe {
                    match ((*input).as_view(), (*output).as_view_mut()) {
                        (Some(i), Some(o)) => (i, o),
                        _ => return $crate::plugin::STATUS_BAD_INPUT,
                    }
                };
                let apply: fn(
                    &$crate::buffer::PixelView<'_>,
                    &mut $crate::buffer::PixelViewMut<'_>,
                ) -> std::result::Result<(), String> = $apply;
                match apply(&input, &mut output) {
                    Ok(()) => $crate::plugin::STATUS_OK,
                    Err(_) => $crate::plugin::STATUS_BAD_INPUT,
                }
            }));
            outcome.unwrap_or($crate::plugin::STATUS_PANICKED)
        }

        static TRANSFORM_DESCRIPTOR: $crate::plugin::TransformDescriptor =
            $crate::plugin::TransformDescriptor {
                abi_version: $crate::plugin::PIXVIEW_ABI_VERSION,
                name: TRANSFORM_NAME.as_ptr() as *const std::ffi::c_char,
                description: TRANSFORM_DESC.as_ptr() as *const std::ffi::c_char,
                apply: Some(__pixview_apply),
            };

        /// Plugin entry point.
        #[unsafe(no_mangle)]
        pub extern "C" fn pixview_transform_descriptor()
        -> *const $crate::plugin::TransformDescriptor {
            &TRANSFORM_DESCRIPTOR
        }
    };
}
