//! Colour type and parsing.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BlazonError, Result};

use super::palette::NamedColour;

/// Colours closer than this (Euclidean distance over 0..1 channels) count
/// as indistinguishable.
pub const MIN_COLOUR_DISTANCE: f64 = 0.1;

/// Named colour substituted for unknown names.
pub const FALLBACK_COLOUR: NamedColour = NamedColour::White;

/// An 8-bit RGB colour, optionally tagged with a palette name.
///
/// A tagged colour always carries its palette entry's canonical channels:
/// setting channels directly drops the tag, and setting a name overwrites
/// the channels.
///
/// Equality compares channels and tag; hashing uses the channels only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ColourRepr", into = "ColourRepr")]
pub struct Colour {
    r: u8,
    g: u8,
    b: u8,
    name: Option<NamedColour>,
}

impl Colour {
    /// Create an untagged colour from 8-bit channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, name: None }
    }

    /// Create a tagged palette colour.
    pub fn named(colour: NamedColour) -> Self {
        let [r, g, b] = colour.rgb();
        Self {
            r,
            g,
            b,
            name: Some(colour),
        }
    }

    /// Resolve a palette name, falling back to the tagged fallback colour
    /// when the name is unknown.
    pub fn from_name(name: &str) -> Self {
        match NamedColour::lookup(name.trim()) {
            Some(colour) => Self::named(colour),
            None => {
                tracing::warn!(name, fallback = FALLBACK_COLOUR.name(), "unknown colour name");
                Self::named(FALLBACK_COLOUR)
            }
        }
    }

    /// Create an untagged colour from 0..1 channels (rounded).
    pub fn from_float3(rgb: [f64; 3]) -> Self {
        let channel = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(BlazonError::InvalidColour {
                message: format!("invalid hex colour: {}", s),
                help: Some("Use #RRGGBB format".to_string()),
            });
        }
        Ok(Self::rgb(
            parse_hex_byte(&hex[0..2])?,
            parse_hex_byte(&hex[2..4])?,
            parse_hex_byte(&hex[4..6])?,
        ))
    }

    /// Parse a raw colour construct: `rgb { r g b }` (0..255),
    /// `hsv { h s v }` (0..1) or `hsv360 { h s v }` (degrees and percent).
    ///
    /// Returns `None` for anything else.
    pub fn from_construct(text: &str) -> Option<Self> {
        let text = text.trim();
        let open = text.find('{')?;
        let close = text.rfind('}')?;
        if close < open {
            return None;
        }
        let kind = text[..open].trim();
        let values: Vec<f64> = text[open + 1..close]
            .split_whitespace()
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .ok()?;
        let [a, b, c] = <[f64; 3]>::try_from(values).ok()?;

        match kind {
            "rgb" => {
                let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
                Some(Self::rgb(channel(a), channel(b), channel(c)))
            }
            "hsv" => Some(hsv_to_colour(a * 360.0, b, c)),
            "hsv360" => Some(hsv_to_colour(a, b / 100.0, c / 100.0)),
            _ => None,
        }
    }

    /// Resolve a colour field value as found in definition files: a raw
    /// construct or a palette name. Unresolvable values fall back like
    /// unknown names.
    pub fn from_script(text: &str) -> Self {
        if text.contains('{') {
            if let Some(colour) = Self::from_construct(text) {
                return colour;
            }
            tracing::warn!(value = text, "unreadable colour construct");
            return Self::named(FALLBACK_COLOUR);
        }
        Self::from_name(text)
    }

    pub fn r(&self) -> u8 {
        self.r
    }

    pub fn g(&self) -> u8 {
        self.g
    }

    pub fn b(&self) -> u8 {
        self.b
    }

    /// Channels as an array.
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Palette tag, if any.
    pub fn name(&self) -> Option<NamedColour> {
        self.name
    }

    /// Replace the channels. Clears the palette tag.
    pub fn set_rgb(&mut self, r: u8, g: u8, b: u8) {
        *self = Self::rgb(r, g, b);
    }

    /// Retag with a palette colour. Overwrites the channels.
    pub fn set_name(&mut self, colour: NamedColour) {
        *self = Self::named(colour);
    }

    /// Value as written in definition files: the palette name when tagged
    /// (unless `force_rgb`), otherwise `rgb { r g b }`.
    pub fn to_script(&self, force_rgb: bool) -> String {
        match self.name {
            Some(name) if !force_rgb => name.name().to_string(),
            _ => format!("rgb {{ {} {} {} }}", self.r, self.g, self.b),
        }
    }

    /// `#RRGGBB`, uppercase.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Channels scaled to 0..1.
    pub fn to_float3(&self) -> [f64; 3] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }

    /// Weighted brightness in 0..1.
    pub fn luminance(&self) -> f64 {
        let [r, g, b] = self.to_float3();
        0.299 * r + 0.587 * g + 0.114 * b
    }

    /// Euclidean distance over 0..1 channels.
    pub fn distance(&self, other: &Colour) -> f64 {
        let a = self.to_float3();
        let b = other.to_float3();
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Background to draw this colour against.
    ///
    /// Returns `background` unless the two are closer than
    /// [`MIN_COLOUR_DISTANCE`], in which case a dark colour gets the light
    /// fallback and a light colour gets the dark fallback (both untagged).
    pub fn contrasting(&self, background: &Colour) -> Colour {
        if self.distance(background) >= MIN_COLOUR_DISTANCE {
            return *background;
        }
        if self.luminance() < 0.5 {
            Self::from_float3(NamedColour::White.float())
        } else {
            Self::from_float3(NamedColour::Black.float())
        }
    }
}

impl Hash for Colour {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.channels().hash(state);
    }
}

impl From<NamedColour> for Colour {
    fn from(colour: NamedColour) -> Self {
        Self::named(colour)
    }
}

impl FromStr for Colour {
    type Err = BlazonError;

    /// Strict parsing for user input: hex, raw construct or palette name.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with('#') {
            return Self::from_hex(s);
        }
        if s.contains('{') {
            return Self::from_construct(s).ok_or_else(|| BlazonError::InvalidColour {
                message: format!("unreadable colour construct: {}", s),
                help: Some("Use rgb { r g b }, hsv { h s v } or hsv360 { h s v }".to_string()),
            });
        }
        if let Ok(named) = s.parse::<NamedColour>() {
            return Ok(Self::named(named));
        }
        Self::from_hex(s).map_err(|_| BlazonError::InvalidColour {
            message: format!("'{}' is not a colour name, hex value or construct", s),
            help: Some("Run `blazon colours` to list the named colours".to_string()),
        })
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Serialized form. Tagged colours are re-resolved on the way in so a
/// stored name can never disagree with its channels.
#[derive(Serialize, Deserialize)]
struct ColourRepr {
    r: u8,
    g: u8,
    b: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<NamedColour>,
}

impl From<ColourRepr> for Colour {
    fn from(repr: ColourRepr) -> Self {
        match repr.name {
            Some(name) => Colour::named(name),
            None => Colour::rgb(repr.r, repr.g, repr.b),
        }
    }
}

impl From<Colour> for ColourRepr {
    fn from(colour: Colour) -> Self {
        ColourRepr {
            r: colour.r,
            g: colour.g,
            b: colour.b,
            name: colour.name,
        }
    }
}

/// Convert HSV (hue in degrees, saturation/value in 0..1) to an untagged
/// colour.
fn hsv_to_colour(hue: f64, saturation: f64, value: f64) -> Colour {
    use palette::{Hsv, IntoColor, Srgb};

    let hsv: Hsv = Hsv::new(
        hue as f32,
        saturation.clamp(0.0, 1.0) as f32,
        value.clamp(0.0, 1.0) as f32,
    );
    let rgb: Srgb = hsv.into_color();
    Colour::from_float3([rgb.red as f64, rgb.green as f64, rgb.blue as f64])
}

/// Parse a two-character hex byte.
fn parse_hex_byte(s: &str) -> Result<u8> {
    u8::from_str_radix(s, 16).map_err(|_| BlazonError::InvalidColour {
        message: format!("invalid hex byte: {}", s),
        help: None,
    })
}
