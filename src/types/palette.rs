//! The fixed table of named colours understood by the game.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BlazonError, Result};

/// A palette colour addressable by name in definition files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColour {
    Red,
    RedDark,
    Orange,
    Yellow,
    YellowLight,
    White,
    Grey,
    Black,
    Brown,
    Green,
    GreenLight,
    BlueLight,
    Blue,
    BlueDark,
    Purple,
}

impl NamedColour {
    /// Every named colour, in display order.
    pub const ALL: [NamedColour; 15] = [
        NamedColour::Red,
        NamedColour::RedDark,
        NamedColour::Orange,
        NamedColour::Yellow,
        NamedColour::YellowLight,
        NamedColour::White,
        NamedColour::Grey,
        NamedColour::Black,
        NamedColour::Brown,
        NamedColour::Green,
        NamedColour::GreenLight,
        NamedColour::BlueLight,
        NamedColour::Blue,
        NamedColour::BlueDark,
        NamedColour::Purple,
    ];

    /// Name as written in definition files.
    pub const fn name(self) -> &'static str {
        match self {
            NamedColour::Red => "red",
            NamedColour::RedDark => "red_dark",
            NamedColour::Orange => "orange",
            NamedColour::Yellow => "yellow",
            NamedColour::YellowLight => "yellow_light",
            NamedColour::White => "white",
            NamedColour::Grey => "grey",
            NamedColour::Black => "black",
            NamedColour::Brown => "brown",
            NamedColour::Green => "green",
            NamedColour::GreenLight => "green_light",
            NamedColour::BlueLight => "blue_light",
            NamedColour::Blue => "blue",
            NamedColour::BlueDark => "blue_dark",
            NamedColour::Purple => "purple",
        }
    }

    /// Canonical channels in 0..1, as the game defines them.
    pub const fn float(self) -> [f64; 3] {
        match self {
            NamedColour::Red => [0.450, 0.133, 0.090],
            NamedColour::RedDark => [0.300, 0.030, 0.030],
            NamedColour::Orange => [0.600, 0.230, 0.000],
            NamedColour::Yellow => [0.750, 0.525, 0.188],
            NamedColour::YellowLight => [1.000, 0.680, 0.200],
            NamedColour::White => [0.800, 0.792, 0.784],
            NamedColour::Grey => [0.500, 0.500, 0.500],
            NamedColour::Black => [0.100, 0.090, 0.075],
            NamedColour::Brown => [0.450, 0.234, 0.117],
            NamedColour::Green => [0.120, 0.300, 0.138],
            NamedColour::GreenLight => [0.200, 0.400, 0.220],
            NamedColour::BlueLight => [0.165, 0.365, 0.550],
            NamedColour::Blue => [0.080, 0.246, 0.400],
            NamedColour::BlueDark => [0.030, 0.170, 0.300],
            NamedColour::Purple => [0.350, 0.105, 0.252],
        }
    }

    /// Canonical 8-bit channels (each float channel scaled by 255 and
    /// truncated).
    pub fn rgb(self) -> [u8; 3] {
        let [r, g, b] = self.float();
        [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
    }

    /// Look up a colour by its file name.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for NamedColour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedColour {
    type Err = BlazonError;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s.trim()).ok_or_else(|| BlazonError::InvalidColour {
            message: format!("unknown colour name '{}'", s),
            help: Some("Run `blazon colours` to list the named colours".to_string()),
        })
    }
}
