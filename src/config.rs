//! Project configuration (blazon.yaml).
//!
//! Holds export defaults, the undo depth and the texture table used as
//! texture metadata by the CLI. Every field is optional.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{BlazonError, Result};
use crate::model::{
    ExportOptions, History, SharedMetadata, DEFAULT_HISTORY_LIMIT, DEFAULT_ROOT_KEY,
};
use crate::types::Vec2;

/// Name of the configuration file looked up by [`Config::discover`].
pub const CONFIG_FILENAME: &str = "blazon.yaml";

/// Offset applied to pasted or duplicated layers when none is configured.
pub const DEFAULT_PASTE_OFFSET: f64 = 0.02;

/// Configuration loaded from blazon.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root identifier written on export.
    pub root_key: String,

    /// Write every colour as `rgb { r g b }`.
    pub force_rgb: bool,

    /// Number of undo states kept.
    pub history_limit: usize,

    /// Distance pasted layers are moved on both axes.
    pub paste_offset: f64,

    /// Texture filename to number of colour channels it uses.
    pub textures: HashMap<String, u8>,

    /// Path substrings skipped when walking directories.
    pub excludes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_key: DEFAULT_ROOT_KEY.to_string(),
            force_rgb: false,
            history_limit: DEFAULT_HISTORY_LIMIT,
            paste_offset: DEFAULT_PASTE_OFFSET,
            textures: HashMap::new(),
            excludes: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BlazonError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from YAML.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content).map_err(|e| BlazonError::Config {
            message: format!("Invalid config: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })?;
        config.check()?;
        Ok(config)
    }

    /// Load `blazon.yaml` from `dir` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILENAME);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn check(&self) -> Result<()> {
        if self.root_key.trim().is_empty() {
            return Err(BlazonError::Config {
                message: "root_key is empty".to_string(),
                help: Some(format!("Remove it to use {}", DEFAULT_ROOT_KEY)),
            });
        }
        if !self.paste_offset.is_finite() {
            return Err(BlazonError::Config {
                message: "paste_offset must be a number".to_string(),
                help: None,
            });
        }
        if let Some((texture, count)) = self.textures.iter().find(|(_, c)| !(1..=3).contains(*c)) {
            return Err(BlazonError::Config {
                message: format!("texture '{}' has {} colours", texture, count),
                help: Some("Colour counts are 1, 2 or 3".to_string()),
            });
        }
        Ok(())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            root_key: self.root_key.clone(),
            force_rgb: self.force_rgb,
        }
    }

    /// The texture table as document metadata.
    pub fn metadata(&self) -> SharedMetadata {
        Arc::new(self.textures.clone())
    }

    /// An empty undo history with the configured depth.
    pub fn history(&self) -> History {
        History::new(self.history_limit)
    }

    pub fn paste_offset(&self) -> Vec2 {
        Vec2::new(self.paste_offset, self.paste_offset)
    }

    /// Whether `path` matches any exclude entry.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.excludes
            .iter()
            .any(|pattern| match pattern.strip_prefix('*') {
                Some(suffix) => path.ends_with(suffix),
                None => path.contains(pattern.as_str()),
            })
    }
}
