//! Host configuration loaded from an optional TOML file.
//!
//! ```toml
//! [plugins]
//! dir = "/opt/pixview/plugins"
//!
//! [codec]
//! jpeg_quality = 85
//!
//! [blur]
//! kernel = 8
//!
//! [logging]
//! filter = "pixview=debug"
//! ```

use crate::codec::DEFAULT_JPEG_QUALITY;
use crate::error::{Error, Result};
use crate::transform::{DEFAULT_KERNEL, MAX_KERNEL};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pixview.toml";

/// Name of the plugin directory next to the host binary.
pub const PLUGIN_DIR_NAME: &str = "plugins";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Plugin discovery.
    pub plugins: PluginsConfig,
    /// Image codec.
    pub codec: CodecConfig,
    /// Built-in blur.
    pub blur: BlurConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// `[plugins]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginsConfig {
    /// Directory scanned for plugin modules. Defaults to `plugins/` next to
    /// the executable.
    pub dir: Option<PathBuf>,
}

/// `[codec]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// JPEG quality used when saving (1-100).
    pub jpeg_quality: u8,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// `[blur]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlurConfig {
    /// Side length of the box blur window.
    pub kernel: usize,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            kernel: DEFAULT_KERNEL,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "pixview=info".to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration file.
    pub fn parse(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Parse a configuration file, falling back to defaults if it does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::parse(path.as_ref()) {
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.codec.jpeg_quality) {
            return Err(Error::Config(format!(
                "codec.jpeg_quality must be within 1..=100, got {}",
                self.codec.jpeg_quality
            )));
        }
        if !(1..=MAX_KERNEL).contains(&self.blur.kernel) {
            return Err(Error::Config(format!(
                "blur.kernel must be within 1..={}, got {}",
                MAX_KERNEL, self.blur.kernel
            )));
        }
        Ok(())
    }

    /// Plugin directory to scan: the configured one, or `plugins/` next to
    /// the running executable.
    pub fn plugin_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.plugins.dir {
            return Ok(dir.clone());
        }
        let exe = std::env::current_exe()?;
        let base = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(base.join(PLUGIN_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert!(cfg.plugins.dir.is_none());
        assert_eq!(cfg.codec.jpeg_quality, DEFAULT_JPEG_QUALITY);
        assert_eq!(cfg.blur.kernel, 8);
        assert_eq!(cfg.logging.filter, "pixview=info");
    }

    #[test]
    fn test_full_file() {
        let cfg = Config::from_toml(
            r#"
            [plugins]
            dir = "/opt/plugins"

            [codec]
            jpeg_quality = 70

            [blur]
            kernel = 3

            [logging]
            filter = "pixview=debug"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.plugin_dir().unwrap(), PathBuf::from("/opt/plugins"));
        assert_eq!(cfg.codec.jpeg_quality, 70);
        assert_eq!(cfg.blur.kernel, 3);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_toml("[codec]\njpeg_quality = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_toml("[blur]\nkernel = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_toml("[blur]\nkernel = 5000"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_toml("[plugins]\npath = 'x'"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_largest_kernel_accepted() {
        let cfg = Config::from_toml(&format!("[blur]\nkernel = {MAX_KERNEL}")).unwrap();
        assert_eq!(cfg.blur.kernel, MAX_KERNEL);
    }

    #[test]
    fn test_default_plugin_dir_next_to_exe() {
        let dir = Config::default().plugin_dir().unwrap();
        assert_eq!(dir.file_name().unwrap(), PLUGIN_DIR_NAME);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.blur.kernel, DEFAULT_KERNEL);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[codec\n").unwrap();
        let err = Config::parse(&path).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
