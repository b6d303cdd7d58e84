//! Texture metadata lookups.
//!
//! The document asks how many colour channels an emblem texture uses when
//! it creates or reads a layer. Where that knowledge comes from (a game
//! install, a project config) is up to the caller.

use std::collections::HashMap;

use crate::types::DEFAULT_COLOUR_COUNT;

/// Source of per-texture facts.
pub trait TextureMetadata {
    /// Number of colour channels `texture` uses, if known.
    fn colour_count(&self, texture: &str) -> Option<u8>;

    /// Whether the source knows nothing at all.
    fn is_empty(&self) -> bool {
        false
    }

    /// Whether `texture` is known.
    fn contains(&self, texture: &str) -> bool {
        self.colour_count(texture).is_some()
    }
}

/// Metadata source that knows no textures.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl TextureMetadata for NoMetadata {
    fn colour_count(&self, _texture: &str) -> Option<u8> {
        None
    }

    fn is_empty(&self) -> bool {
        true
    }
}

impl TextureMetadata for HashMap<String, u8> {
    fn colour_count(&self, texture: &str) -> Option<u8> {
        self.get(texture).copied()
    }

    fn is_empty(&self) -> bool {
        HashMap::is_empty(self)
    }
}

/// Colour count for `texture`, clamped to 1..=3, defaulting to
/// [`DEFAULT_COLOUR_COUNT`].
pub fn resolve_colour_count(metadata: &dyn TextureMetadata, texture: &str) -> u8 {
    metadata
        .colour_count(texture)
        .map(|count| count.clamp(1, 3))
        .unwrap_or(DEFAULT_COLOUR_COUNT)
}
