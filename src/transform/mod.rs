//! Pixel transforms.
//!
//! Anything that maps one [`PixelBuffer`] to another implements
//! [`Transform`]. Two families exist:
//!
//! - built-in transforms compiled into the host, such as [`BoxBlur`]
//! - plugin transforms loaded from shared libraries
//!   ([`PluginTransform`](crate::plugin::PluginTransform))
//!
//! The host never trusts a transform to honor its contract silently:
//! [`check_output`] runs after every `apply`.

mod blur;

pub use blur::{BoxBlur, DEFAULT_KERNEL, MAX_KERNEL};

use crate::buffer::{PixelBuffer, PixelView};
use crate::error::{Error, Result};

/// Capability contract for a pixel transform.
///
/// Implementations read rows through `stride`, never `width * 3`, so that
/// padded rows are tolerated.
pub trait Transform: Send + Sync {
    /// Stable identifier used to select this transform.
    fn name(&self) -> &str;

    /// Produce a new buffer from `input`.
    fn apply(&self, input: &PixelView<'_>) -> Result<PixelBuffer>;

    /// Whether the output may have different dimensions than the input.
    fn resizes(&self) -> bool {
        false
    }
}

/// Validate a transform result against its input.
///
/// The pixel format must always match. Non-resizing transforms must also
/// keep width, height and stride.
pub fn check_output(
    transform: &dyn Transform,
    input: &PixelView<'_>,
    output: &PixelBuffer,
) -> Result<()> {
    let expected = input.shape();
    let actual = output.shape();
    let shape_ok = transform.resizes()
        || (expected.width == actual.width
            && expected.height == actual.height
            && expected.stride == actual.stride);
    if expected.format != actual.format || !shape_ok {
        return Err(Error::TransformContractViolation {
            name: transform.name().to_string(),
            expected_width: expected.width,
            expected_height: expected.height,
            expected_stride: expected.stride,
            width: actual.width,
            height: actual.height,
            stride: actual.stride,
        });
    }
    Ok(())
}

/// Built-in transforms, kept in registration order.
pub struct BuiltinTransforms {
    transforms: Vec<Box<dyn Transform>>,
}

impl BuiltinTransforms {
    /// Create a set without any transform.
    pub fn empty() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// The standard set: a box blur with the given kernel size.
    pub fn standard(blur_kernel: usize) -> Self {
        let mut set = Self::empty();
        set.add(Box::new(BoxBlur::new(blur_kernel)));
        set
    }

    /// Add a transform. Returns false if the name is already taken.
    pub fn add(&mut self, transform: Box<dyn Transform>) -> bool {
        if self.get(transform.name()).is_some() {
            return false;
        }
        self.transforms.push(transform);
        true
    }

    /// Look up a transform by name.
    pub fn get(&self, name: &str) -> Option<&dyn Transform> {
        self.transforms
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transforms.iter().map(|t| t.name())
    }
}

/// The standard set with the default blur kernel.
impl Default for BuiltinTransforms {
    fn default() -> Self {
        Self::standard(DEFAULT_KERNEL)
    }
}

impl std::fmt::Debug for BuiltinTransforms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
