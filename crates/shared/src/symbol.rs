use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("expected a #rrggbb or rgba(r,g,b,a) color, got {0:?}")]
    Malformed(String),
    #[error("alpha must be within 0..=1, got {0}")]
    AlphaOutOfRange(String),
}

/// An sRGB color with straight alpha in `[0, 1]`.
///
/// Serialized as `#rrggbb` when opaque and `rgba(r,g,b,a)` otherwise, which is
/// also what `to_css` produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Color { r, g, b, a }
    }

    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let malformed = || ColorError::Malformed(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(malformed)?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(malformed());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| malformed());
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn from_rgba_fn(s: &str) -> Result<Self, ColorError> {
        let malformed = || ColorError::Malformed(s.to_string());
        let inner = s
            .strip_prefix("rgba(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(malformed)?;
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        let [r, g, b, a] = parts.as_slice() else {
            return Err(malformed());
        };
        let channel = |c: &str| c.parse::<u8>().map_err(|_| malformed());
        let alpha: f64 = a.parse().map_err(|_| malformed())?;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(ColorError::AlphaOutOfRange(a.to_string()));
        }
        Ok(Color::rgba(channel(*r)?, channel(*g)?, channel(*b)?, alpha))
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    pub fn to_css(&self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

impl std::str::FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('#') {
            Color::from_hex(s)
        } else {
            Color::from_rgba_fn(s)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_css()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_css())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub width: f64,
    pub color: Color,
}

impl Default for Outline {
    /// Thin white county border.
    fn default() -> Self {
        Outline {
            width: 0.5,
            color: Color::WHITE,
        }
    }
}

/// Solid polygon fill handed to the renderer for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillSymbol {
    pub color: Color,
    #[serde(default)]
    pub outline: Outline,
}

impl FillSymbol {
    pub const fn solid(color: Color) -> Self {
        FillSymbol {
            color,
            outline: Outline {
                width: 0.5,
                color: Color::WHITE,
            },
        }
    }
}
