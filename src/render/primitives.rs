use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Ten-color categorical palette assigned to datasets without an explicit color.
const CATEGORY_PALETTE: [Color; 10] = [
    Color::from_rgb8(0x1f, 0x77, 0xb4),
    Color::from_rgb8(0xff, 0x7f, 0x0e),
    Color::from_rgb8(0x2c, 0xa0, 0x2c),
    Color::from_rgb8(0xd6, 0x27, 0x28),
    Color::from_rgb8(0x94, 0x67, 0xbd),
    Color::from_rgb8(0x8c, 0x56, 0x4b),
    Color::from_rgb8(0xe3, 0x77, 0xc2),
    Color::from_rgb8(0x7f, 0x7f, 0x7f),
    Color::from_rgb8(0xbc, 0xbd, 0x22),
    Color::from_rgb8(0x17, 0xbe, 0xcf),
];

/// RGBA color in normalized 0..=1 channel values.
///
/// Serializes as `#rrggbb` (or `#rrggbbaa` when not opaque).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    pub const AXIS: Self = Self::from_rgb8(0x33, 0x33, 0x33);
    pub const GRIDLINE: Self = Self::from_rgb8(0xe0, 0xe0, 0xe0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    #[must_use]
    pub const fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(
            red as f64 / 255.0,
            green as f64 / 255.0,
            blue as f64 / 255.0,
        )
    }

    /// Palette entry for the dataset inserted at `index`.
    #[must_use]
    pub fn palette(index: usize) -> Self {
        CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()]
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(text: &str) -> ChartResult<Self> {
        let invalid = || ChartError::InvalidConfig(format!("`{text}` is not a hex color"));
        let hex = text.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };

        match hex.len() {
            3 => {
                let short = |index: usize| {
                    u8::from_str_radix(&hex[index..=index], 16)
                        .map(|value| value * 17)
                        .map_err(|_| invalid())
                };
                Ok(Self::from_rgb8(short(0)?, short(1)?, short(2)?))
            }
            6 => Ok(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => {
                let base = Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?);
                Ok(Self {
                    alpha: f64::from(channel(6..8)?) / 255.0,
                    ..base
                })
            }
            _ => Err(invalid()),
        }
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        let to_byte = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        let mut hex = format!(
            "#{:02x}{:02x}{:02x}",
            to_byte(self.red),
            to_byte(self.green),
            to_byte(self.blue)
        );
        if self.alpha < 1.0 {
            hex.push_str(&format!("{:02x}", to_byte(self.alpha)));
        }
        hex
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = ChartError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Horizontal text alignment relative to the text anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn hex_round_trip_keeps_bytes() {
        let color = Color::from_hex("#1f77b4").expect("valid hex");
        assert_eq!(color.to_hex(), "#1f77b4");
        assert_eq!(Color::from_hex("#fff").expect("short hex").to_hex(), "#ffffff");
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert!(Color::from_hex("1f77b4").is_err());
        assert!(Color::from_hex("#1f77").is_err());
        assert!(Color::from_hex("#zzzzzz").is_err());
    }
}
