//! Brush colors as they travel on the wire (`#rrggbb`).

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Color string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color {0:?}, expected #rrggbb")]
pub struct ColorParseError(pub String);

/// An opaque RGB color written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbHex {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbHex {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to a fully opaque paint color.
    pub fn to_color(self) -> Color {
        Color::from_rgba8(self.r, self.g, self.b, 255)
    }
}

impl Default for RgbHex {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for RgbHex {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ColorParseError(s.to_string());
        let hex = s.trim();
        if !hex.is_ascii() || hex.len() != 7 || !hex.starts_with('#') {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| invalid());
        Ok(Self::new(channel(1..3)?, channel(3..5)?, channel(5..7)?))
    }
}

impl TryFrom<String> for RgbHex {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RgbHex> for String {
    fn from(color: RgbHex) -> Self {
        color.to_string()
    }
}

impl From<RgbHex> for Color {
    fn from(color: RgbHex) -> Self {
        color.to_color()
    }
}

impl fmt::Display for RgbHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
