//! 8-bit RGB colors as reported by annotation services.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque 8-bit-per-channel color.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Color from channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Color from a packed `0xRRGGBB` value. Bits above 24 are ignored.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Packed `0xRRGGBB` value.
    #[must_use]
    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Parse `#RRGGBB` / `RRGGBB` (case-insensitive). Returns `None` for
    /// anything else.
    #[must_use]
    pub fn parse_hex(s: &str) -> Option<Self> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_hex)
    }

    /// Normalized `[r, g, b]` for GPU color buffers.
    #[must_use]
    pub fn to_f32(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_colors() {
        assert_eq!(Rgb::parse_hex("#AA4A44"), Some(Rgb::new(0xAA, 0x4A, 0x44)));
        assert_eq!(Rgb::parse_hex("00ff00"), Some(Rgb::new(0, 255, 0)));
        assert_eq!(Rgb::parse_hex("black"), None);
        assert_eq!(Rgb::parse_hex("#12345"), None);
        assert_eq!(Rgb::parse_hex(""), None);
    }

    #[test]
    fn hex_and_display() {
        let c = Rgb::from_hex(0x7A_1B1B);
        assert_eq!(c.to_hex(), 0x7A_1B1B);
        assert_eq!(c.to_string(), "#7A1B1B");
        assert_eq!(Rgb::new(255, 0, 0).to_f32(), [1.0, 0.0, 0.0]);
    }
}
