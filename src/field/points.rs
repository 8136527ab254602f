use crate::engine::config::EngineConfig;
use crate::foundation::core::{Point, Rgba8};
use crate::sampling::pixels::PixelBuffer;

/// Channel value above which a pixel counts as near-white (when all three exceed it).
pub const NEAR_WHITE: u8 = 200;

/// A single dot of the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    rest_x: f64,
    rest_y: f64,
    pub color: Rgba8,
}

impl Particle {
    /// Particle resting (and currently sitting) at `(x, y)`.
    pub fn new(x: f64, y: f64, color: Rgba8) -> Self {
        Self {
            x,
            y,
            rest_x: x,
            rest_y: y,
            color,
        }
    }

    pub fn rest_x(&self) -> f64 {
        self.rest_x
    }

    pub fn rest_y(&self) -> f64 {
        self.rest_y
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn rest(&self) -> Point {
        Point::new(self.rest_x, self.rest_y)
    }

    /// Distance from the current position to the rest position.
    pub fn displacement(&self) -> f64 {
        self.position().distance(self.rest())
    }
}

/// True when a sampled pixel should not become a particle.
pub fn is_skipped(rgba: [u8; 4]) -> bool {
    let [r, g, b, a] = rgba;
    (r > NEAR_WHITE && g > NEAR_WHITE && b > NEAR_WHITE) || a == 0
}

/// Scan `buffer` on a `density` grid and emit one particle per kept pixel, row by row.
pub fn build(buffer: &PixelBuffer, config: &EngineConfig) -> Vec<Particle> {
    let step = config.density.max(1) as usize;
    let mut out = Vec::new();
    for i in (0..buffer.height()).step_by(step) {
        for j in (0..buffer.width()).step_by(step) {
            let rgba = buffer.pixel(j, i);
            if is_skipped(rgba) {
                continue;
            }
            let color = config
                .override_color
                .unwrap_or(Rgba8::opaque(rgba[0], rgba[1], rgba[2]));
            out.push(Particle::new(f64::from(j), f64::from(i), color));
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/field/points.rs"]
mod tests;
