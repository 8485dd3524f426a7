//! Editing session: the current image, its path and the transforms that can
//! be applied to it.
//!
//! Every operation either succeeds completely or leaves the session exactly
//! as it was. There is no partial replacement of the current buffer.

use crate::buffer::PixelBuffer;
use crate::codec::{ImageCodec, ImageCrateCodec};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::ImageFormat;
use crate::listing::{DirectoryListing, FsListing};
use crate::navigation::{Boundary, NavigationIndex, Neighbor};
use crate::observability;
use crate::plugin::PluginRegistry;
use crate::transform::{BuiltinTransforms, Transform, check_output};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The neighbor was loaded and is now current.
    Moved(PathBuf),
    /// Nothing was loaded; the session is unchanged.
    Boundary(Boundary),
}

/// Status line describing the current image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    /// Image as loaded from disk.
    Loaded {
        /// Source file.
        path: PathBuf,
        /// Width in pixels.
        width: usize,
        /// Height in pixels.
        height: usize,
        /// Size of the source file.
        bytes: usize,
    },
    /// Image modified by at least one transform.
    Edited {
        /// Width in pixels.
        width: usize,
        /// Height in pixels.
        height: usize,
    },
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded {
                path,
                width,
                height,
                bytes,
            } => write!(f, "{}, {}x{}, {} Bytes", path.display(), width, height, bytes),
            Self::Edited { width, height } => write!(f, "(edited image), {}x{}", width, height),
        }
    }
}

#[derive(Debug)]
struct CurrentImage {
    path: PathBuf,
    buffer: PixelBuffer,
    file_size: usize,
    edited: bool,
}

/// Orchestrates loading, editing, navigating and saving one image at a time.
pub struct EditorSession<C = ImageCrateCodec, L = FsListing> {
    current: Option<CurrentImage>,
    registry: Arc<PluginRegistry>,
    builtins: BuiltinTransforms,
    codec: C,
    navigation: NavigationIndex<L>,
}

impl EditorSession {
    /// Session with the standard built-ins, the default codec and the real
    /// filesystem.
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self::with_parts(
            registry,
            BuiltinTransforms::default(),
            ImageCrateCodec::new(),
            NavigationIndex::new(),
        )
    }

    /// Session configured from `config`.
    pub fn from_config(config: &Config, registry: Arc<PluginRegistry>) -> Self {
        Self::with_parts(
            registry,
            BuiltinTransforms::standard(config.blur.kernel),
            ImageCrateCodec::new().with_jpeg_quality(config.codec.jpeg_quality),
            NavigationIndex::new(),
        )
    }
}

impl<C: ImageCodec, L: DirectoryListing> EditorSession<C, L> {
    /// Session assembled from explicit collaborators.
    pub fn with_parts(
        registry: Arc<PluginRegistry>,
        builtins: BuiltinTransforms,
        codec: C,
        navigation: NavigationIndex<L>,
    ) -> Self {
        Self {
            current: None,
            registry,
            builtins,
            codec,
            navigation,
        }
    }

    /// Decode `path` and make it the current image.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let _span = observability::span_load(path).entered();

        let bytes = fs::read(path)?;
        let buffer = self.codec.decode(path, &bytes)?;
        tracing::info!(
            path = %path.display(),
            width = buffer.width(),
            height = buffer.height(),
            "loaded image"
        );
        observability::record_image_loaded();

        self.current = Some(CurrentImage {
            path: path.to_path_buf(),
            buffer,
            file_size: bytes.len(),
            edited: false,
        });
        Ok(())
    }

    /// Apply the transform called `name` to the current image.
    ///
    /// Built-ins shadow plugins of the same name. The current buffer is only
    /// replaced if the transform succeeds and its output has the expected
    /// shape.
    pub fn apply_transform(&mut self, name: &str) -> Result<()> {
        let current = self.current.as_ref().ok_or(Error::NoCurrentImage)?;
        let transform = self.resolve(name)?;

        let input = current.buffer.as_view();
        let _span =
            observability::span_transform(name, input.width(), input.height()).entered();
        let timer = observability::TransformTimer::start();

        let output = transform
            .apply(&input)
            .and_then(|output| check_output(transform, &input, &output).map(|()| output));
        let output = match output {
            Ok(output) => output,
            Err(e) => {
                observability::trace_transform_error(name, &e);
                observability::record_transform_failed(name);
                return Err(e);
            }
        };
        observability::record_transform_applied(name, timer.elapsed());

        if let Some(current) = self.current.as_mut() {
            current.buffer = output;
            current.edited = true;
        }
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<&dyn Transform> {
        if let Some(builtin) = self.builtins.get(name) {
            return Ok(builtin);
        }
        self.registry
            .get(name)
            .map(|plugin| plugin as &dyn Transform)
            .ok_or_else(|| Error::UnknownTransform(name.to_string()))
    }

    /// Load the image before the current one in directory order.
    pub fn go_to_previous(&mut self) -> Result<Navigation> {
        let path = self.current_path().ok_or(Error::NoCurrentImage)?;
        let neighbor = self.navigation.predecessor(path)?;
        self.follow(neighbor)
    }

    /// Load the image after the current one in directory order.
    pub fn go_to_next(&mut self) -> Result<Navigation> {
        let path = self.current_path().ok_or(Error::NoCurrentImage)?;
        let neighbor = self.navigation.successor(path)?;
        self.follow(neighbor)
    }

    fn follow(&mut self, neighbor: Neighbor) -> Result<Navigation> {
        match neighbor.into_result() {
            Ok(path) => {
                self.load(&path)?;
                Ok(Navigation::Moved(path))
            }
            Err(boundary) => {
                tracing::info!(signal = boundary.label(), "{}", boundary);
                observability::record_navigation_boundary(boundary.label());
                Ok(Navigation::Boundary(boundary))
            }
        }
    }

    /// Encode the current image into `path`. The format follows the
    /// extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let current = self.current.as_ref().ok_or(Error::NoCurrentImage)?;
        let format = ImageFormat::from_path(path)
            .ok_or_else(|| Error::UnsupportedFormat(path.to_path_buf()))?;

        let bytes = self.codec.encode(&current.buffer.as_view(), format)?;
        fs::write(path, &bytes)?;
        tracing::info!(path = %path.display(), %format, bytes = bytes.len(), "saved image");
        Ok(())
    }

    /// Status line for the current image, if any.
    pub fn status(&self) -> Option<ImageStatus> {
        let current = self.current.as_ref()?;
        let (width, height) = (current.buffer.width(), current.buffer.height());
        Some(if current.edited {
            ImageStatus::Edited { width, height }
        } else {
            ImageStatus::Loaded {
                path: current.path.clone(),
                width,
                height,
                bytes: current.file_size,
            }
        })
    }

    /// Every selectable transform: built-ins first, then plugins in
    /// discovery order. A plugin shadowed by a built-in is listed once.
    pub fn transform_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.builtins.names().map(str::to_string).collect();
        for name in self.registry.names() {
            if self.builtins.get(name).is_none() {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Path of the current image.
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|c| c.path.as_path())
    }

    /// Pixels of the current image.
    pub fn current_buffer(&self) -> Option<&PixelBuffer> {
        self.current.as_ref().map(|c| &c.buffer)
    }

    /// Whether the current image has been transformed since it was loaded.
    pub fn is_edited(&self) -> bool {
        self.current.as_ref().is_some_and(|c| c.edited)
    }

    /// Plugin transforms available to this session.
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }
}

impl<C, L> fmt::Debug for EditorSession<C, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("current", &self.current.as_ref().map(|c| &c.path))
            .field("builtins", &self.builtins)
            .field("registry", &self.registry)
            .finish()
    }
}
