//! The coat-of-arms document.
//!
//! [`CoatOfArms`] owns the pattern, the three base colours and the ordered
//! layer sequence (index 0 is furthest back). It is the only way to change
//! layer order or container membership, and every such change ends with a
//! contiguity pass over container tags.
//!
//! The caller owns the document and passes it wherever it is needed; there
//! is no shared "active" document.
//!
//! # Usage
//!
//! ```
//! use blazon::CoatOfArms;
//!
//! let mut coa = CoatOfArms::new();
//! let lion = coa.add_layer("ce_lion.dds", None).unwrap();
//! coa.duplicate_layer(&lion).unwrap();
//! assert_eq!(coa.layer_count(), 2);
//!
//! let text = coa.to_string();
//! let reread: CoatOfArms = text.parse().unwrap();
//! assert_eq!(reread.layer_count(), 2);
//! ```

mod containers;
mod document;
mod layers;
pub mod metadata;
mod snapshot;

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{channel_index, Colour, Layer, NamedColour};

pub use containers::ContainerSplit;
pub use metadata::{resolve_colour_count, NoMetadata, TextureMetadata};
pub use snapshot::{History, Snapshot, DEFAULT_HISTORY_LIMIT};

/// Pattern texture of a new document.
pub const DEFAULT_PATTERN: &str = "pattern_solid.dds";

/// Base colours of a new document, by channel.
pub const DEFAULT_BASE_COLOURS: [NamedColour; 3] =
    [NamedColour::Purple, NamedColour::Yellow, NamedColour::Black];

/// Root key written on export.
pub const DEFAULT_ROOT_KEY: &str = "coa_export";

/// Shared texture metadata handle.
pub type SharedMetadata = Arc<dyn TextureMetadata + Send + Sync>;

/// Export settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Root identifier of the written document.
    pub root_key: String,
    /// Write every colour as `rgb { r g b }`, even palette colours.
    pub force_rgb: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            root_key: DEFAULT_ROOT_KEY.to_string(),
            force_rgb: false,
        }
    }
}

/// A coat-of-arms document.
#[derive(Clone)]
pub struct CoatOfArms {
    pattern: String,
    base_colours: [Colour; 3],
    layers: Vec<Layer>,
    metadata: SharedMetadata,
    options: ExportOptions,
    source_key: Option<String>,
}

impl Default for CoatOfArms {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CoatOfArms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoatOfArms")
            .field("pattern", &self.pattern)
            .field("base_colours", &self.base_colours)
            .field("layers", &self.layers)
            .field("options", &self.options)
            .field("source_key", &self.source_key)
            .finish_non_exhaustive()
    }
}

impl CoatOfArms {
    /// An empty document with default pattern and colours and no texture
    /// metadata.
    pub fn new() -> Self {
        Self::with_metadata(Arc::new(NoMetadata))
    }

    /// An empty document that looks up texture colour counts in `metadata`.
    pub fn with_metadata(metadata: SharedMetadata) -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            base_colours: DEFAULT_BASE_COLOURS.map(Colour::named),
            layers: Vec::new(),
            metadata,
            options: ExportOptions::default(),
            source_key: None,
        }
    }

    /// Reset to a new document. Metadata and export options are kept.
    pub fn clear(&mut self) {
        self.pattern = DEFAULT_PATTERN.to_string();
        self.base_colours = DEFAULT_BASE_COLOURS.map(Colour::named);
        self.layers.clear();
        self.source_key = None;
    }

    pub fn metadata(&self) -> &dyn TextureMetadata {
        self.metadata.as_ref()
    }

    pub fn set_metadata(&mut self, metadata: SharedMetadata) {
        self.metadata = metadata;
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ExportOptions) {
        self.options = options;
    }

    /// Root key of the last full document read, if it had one.
    pub fn source_key(&self) -> Option<&str> {
        self.source_key.as_deref()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn set_pattern(&mut self, pattern: impl Into<String>) {
        self.pattern = pattern.into();
    }

    pub fn base_colours(&self) -> &[Colour; 3] {
        &self.base_colours
    }

    /// Base colour of channel 1, 2 or 3.
    pub fn base_colour(&self, channel: usize) -> Result<Colour> {
        Ok(self.base_colours[channel_index(channel)?])
    }

    pub fn set_base_colour(&mut self, channel: usize, colour: Colour) -> Result<()> {
        self.base_colours[channel_index(channel)?] = colour;
        Ok(())
    }
}
