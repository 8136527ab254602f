use std::str::FromStr;

use crate::foundation::error::{StippleError, StippleResult};

pub use kurbo::{Point, Vec2};

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Accepts `rgba(r,g,b,a)` (alpha in `0..=1`), `rgb(r,g,b)`, `#rrggbb` and `#rrggbbaa`.
impl FromStr for Rgba8 {
    type Err = StippleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }

        let lower = s.to_ascii_lowercase();
        let (args, has_alpha) = if let Some(rest) = lower.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = lower.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(StippleError::validation(format!("unrecognized color '{s}'")));
        };
        let args = args
            .strip_suffix(')')
            .ok_or_else(|| StippleError::validation(format!("unterminated color '{s}'")))?;

        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(StippleError::validation(format!(
                "color '{s}' needs {expected} components"
            )));
        }

        let channel = |v: &str| -> StippleResult<u8> {
            let f: f64 = v
                .parse()
                .map_err(|_| StippleError::validation(format!("bad color channel '{v}'")))?;
            if !f.is_finite() || !(0.0..=255.0).contains(&f) {
                return Err(StippleError::validation(format!(
                    "color channel '{v}' out of range"
                )));
            }
            Ok(f.round() as u8)
        };

        let a = if has_alpha {
            let f: f64 = parts[3]
                .parse()
                .map_err(|_| StippleError::validation(format!("bad alpha '{}'", parts[3])))?;
            if !f.is_finite() || !(0.0..=1.0).contains(&f) {
                return Err(StippleError::validation(format!(
                    "alpha '{}' out of range",
                    parts[3]
                )));
            }
            (f * 255.0).round() as u8
        } else {
            255
        };

        Ok(Self::new(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            a,
        ))
    }
}

fn parse_hex(hex: &str) -> StippleResult<Rgba8> {
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(StippleError::validation(format!(
            "hex color '#{hex}' must have 6 or 8 digits"
        )));
    }
    let byte = |i: usize| -> StippleResult<u8> {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| StippleError::validation(format!("bad hex color '#{hex}'")))
    };
    let a = if hex.len() == 8 { byte(6)? } else { 255 };
    Ok(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, a))
}

/// Measured size of the drawing surface in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A surface with no area cannot back a pixel buffer.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
