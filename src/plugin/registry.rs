//! Plugin registry: discovery, validation and name lookup.

use super::loader::{PluginError, PluginLoader, PluginTransform};
use crate::listing::DirectoryListing;
use crate::observability;
use crate::transform::Transform;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Why a discovered candidate was not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The module could not be loaded or failed the capability check.
    LoadFailed(PluginError),
    /// The module reported an empty name.
    EmptyName,
    /// Another module already registered this name.
    DuplicateName {
        /// Name reported by the rejected module.
        name: String,
        /// Module that owns the name.
        existing: PathBuf,
    },
}

/// A skipped plugin candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDiagnostic {
    /// Candidate file.
    pub path: PathBuf,
    /// Reason it was skipped.
    pub kind: DiagnosticKind,
}

impl std::fmt::Display for PluginDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DiagnosticKind::LoadFailed(e) => write!(f, "bad plugin {}: {}", self.path.display(), e),
            DiagnosticKind::EmptyName => {
                write!(f, "bad plugin {}: empty transform name", self.path.display())
            }
            DiagnosticKind::DuplicateName { name, existing } => write!(
                f,
                "skipped plugin {}: '{}' already provided by {}",
                self.path.display(),
                name,
                existing.display()
            ),
        }
    }
}

/// Name → transform mapping built once at startup.
///
/// Names are unique. When two modules report the same name, the one whose
/// file name sorts first is kept and the other is recorded as a diagnostic.
/// The registry is never rescanned; a changed plugin directory requires a
/// restart.
#[derive(Default)]
pub struct PluginRegistry {
    transforms: HashMap<String, PluginTransform>,
    /// Names in registration order.
    order: Vec<String>,
    diagnostics: Vec<PluginDiagnostic>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `dir` for modules and register every valid one.
    ///
    /// Never fails: unreadable directories yield an empty registry and bad
    /// candidates end up in [`diagnostics`](Self::diagnostics).
    ///
    /// # Safety
    ///
    /// Loading plugins executes code from shared libraries.
    /// All plugins in the directory must be trusted.
    pub unsafe fn discover(dir: impl AsRef<Path>) -> Self {
        // SAFETY: Caller guarantees all plugins are trusted.
        unsafe { Self::discover_with(&PluginLoader::new(), dir) }
    }

    /// Like [`discover`](Self::discover), with an explicit loader.
    ///
    /// # Safety
    ///
    /// See [`discover`](Self::discover).
    pub unsafe fn discover_with<L: DirectoryListing>(
        loader: &PluginLoader<L>,
        dir: impl AsRef<Path>,
    ) -> Self {
        let dir = dir.as_ref();
        let _span = observability::span_discovery(dir).entered();

        let mut registry = Self::new();
        for path in loader.candidates(dir) {
            tracing::debug!(path = %path.display(), "loading plugin candidate");
            // SAFETY: Caller guarantees all plugins are trusted.
            let loaded = unsafe { loader.load_from_path(&path) };
            registry.admit(path, loaded);
        }

        tracing::info!(
            dir = %dir.display(),
            loaded = registry.len(),
            rejected = registry.diagnostics.len(),
            "plugin discovery finished"
        );
        registry
    }

    /// Register the outcome of loading one candidate.
    ///
    /// Returns true if the transform was added. Failures and name conflicts
    /// are recorded as diagnostics and logged, never propagated.
    pub fn admit(
        &mut self,
        origin: impl Into<PathBuf>,
        loaded: Result<PluginTransform, PluginError>,
    ) -> bool {
        let origin = origin.into();
        let kind = match loaded {
            Err(e) => DiagnosticKind::LoadFailed(e),
            Ok(transform) if transform.name().is_empty() => DiagnosticKind::EmptyName,
            Ok(transform) => match self.transforms.get(transform.name()) {
                Some(existing) => DiagnosticKind::DuplicateName {
                    name: transform.name().to_string(),
                    existing: existing.origin().to_path_buf(),
                },
                None => {
                    let name = transform.name().to_string();
                    tracing::debug!(name = %name, path = %origin.display(), "registered plugin transform");
                    observability::record_plugin_loaded();
                    self.order.push(name.clone());
                    self.transforms.insert(name, transform);
                    return true;
                }
            },
        };

        let diagnostic = PluginDiagnostic { path: origin, kind };
        tracing::warn!("{}", diagnostic);
        observability::record_plugin_rejected();
        self.diagnostics.push(diagnostic);
        false
    }

    /// Look up a transform by name.
    pub fn get(&self, name: &str) -> Option<&PluginTransform> {
        self.transforms.get(name)
    }

    /// Check if a transform is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Registered transforms in registration order.
    pub fn transforms(&self) -> impl Iterator<Item = &PluginTransform> {
        self.order.iter().filter_map(|name| self.transforms.get(name))
    }

    /// Number of registered transforms.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether no transform is registered.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Candidates skipped during discovery, in discovery order.
    pub fn diagnostics(&self) -> &[PluginDiagnostic] {
        &self.diagnostics
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("transforms", &self.order)
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}
