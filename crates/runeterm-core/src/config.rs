//! Configuration types for runeterm.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Shell settings
    pub shell: ShellSettings,
    /// Font settings
    pub font: FontSettings,
    /// Viewport settings
    pub viewport: ViewportSettings,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: Config =
            serde_yaml::from_str(yaml).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.shell.path.is_empty() {
            return Err(crate::Error::Config("shell.path must not be empty".into()));
        }
        if self.shell.read_buffer_size == 0 {
            return Err(crate::Error::Config(
                "shell.read_buffer_size must be > 0".into(),
            ));
        }
        if self.font.size_px <= 0.0 {
            return Err(crate::Error::Config("font.size_px must be > 0".into()));
        }
        if self.font.glyph_cache_capacity == 0 {
            return Err(crate::Error::Config(
                "font.glyph_cache_capacity must be > 0".into(),
            ));
        }
        if self.viewport.width_px == 0 || self.viewport.height_px == 0 {
            return Err(crate::Error::Config(
                "viewport dimensions must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Shell process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    /// Path to the shell executable
    pub path: String,
    /// Size of the per-tick PTY read buffer in bytes
    pub read_buffer_size: usize,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            path: "/bin/sh".to_string(),
            read_buffer_size: 4096,
        }
    }
}

/// Font settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    /// Path to the .ttf/.otf font file
    pub path: String,
    /// Font size in pixels
    pub size_px: f32,
    /// Maximum number of non-ASCII glyphs kept in the cache
    pub glyph_cache_capacity: usize,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            path: String::new(),
            size_px: 14.0,
            glyph_cache_capacity: 1024,
        }
    }
}

/// Viewport settings used to size the grid at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Viewport width in pixels
    pub width_px: u32,
    /// Viewport height in pixels
    pub height_px: u32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            width_px: 800,
            height_px: 600,
        }
    }
}
