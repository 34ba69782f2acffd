//! Canvas cell colors.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::ProtocolError;

/// A 24-bit RGB color.
///
/// On the wire it is a hex string. Both `#RGB` and `#RRGGBB` are
/// accepted (case-insensitive); output is always uppercase `#RRGGBB`.
/// Because parsing happens during deserialization, a stroke with a bad
/// color never reaches the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    /// The default canvas background.
    pub const WHITE: Color = Color(0xFF_FF_FF);
    pub const BLACK: Color = Color(0x00_00_00);

    /// Builds a color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl FromStr for Color {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        match hex.len() {
            6 => u32::from_str_radix(hex, 16).map(Color).map_err(|_| invalid()),
            3 => {
                // #abc is shorthand for #aabbcc
                let mut packed = 0u32;
                for digit in hex.chars() {
                    let nibble = digit.to_digit(16).ok_or_else(invalid)?;
                    packed = (packed << 8) | (nibble << 4) | nibble;
                }
                Ok(Color(packed))
            }
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
