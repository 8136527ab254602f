use crate::foundation::core::{Rgba8, SurfaceSize};
use crate::foundation::error::{StippleError, StippleResult};

/// How particles are colored each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Keep the color sampled from the image (or the override color).
    #[default]
    Sampled,
    /// Recolor every particle to a random opaque color on every frame.
    Chaotic,
}

/// Margin subtracted from each surface dimension before deciding whether to scale the image.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SampleMargin {
    /// Fraction of the dimension, e.g. `0.1` keeps a 10% margin.
    Fraction(f64),
    /// Fixed number of pixels.
    Pixels(f64),
}

impl SampleMargin {
    /// Usable extent of a surface dimension, never below one pixel.
    pub fn reduce(self, dim: u32) -> f64 {
        let dim = f64::from(dim);
        let reduced = match self {
            Self::Fraction(f) => dim - dim * f,
            Self::Pixels(px) => dim - px,
        };
        reduced.max(1.0)
    }
}

/// Strategy used to enumerate particle pairs for the line pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStrategy {
    /// Compare every pair, O(n²).
    #[default]
    BruteForce,
    /// Bucket particles into cells of `line_draw_distance`; same pairs as brute force.
    SpatialGrid,
}

/// Built-in tuning presets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Density and radius follow the surface width; touching particles bond with heavy lines.
    #[default]
    Responsive,
    /// Fixed density with thin connective lines over a longer reach.
    Fixed,
}

/// Tuning for one sampling generation.
///
/// Derived from [`EngineOptions`] and the current [`SurfaceSize`]; rebuilt on every resize.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// Grid stride in pixels.
    pub density: u32,
    /// Pairs at most this far apart are connected by a line.
    pub line_draw_distance: f64,
    /// Disc radius of each particle.
    pub base_radius: f64,
    /// Multiplier applied to the line width falloff.
    pub max_line_thickness: f64,
    /// Strength of the pointer impulse.
    pub reaction_sensitivity: f64,
    /// Global line width scale.
    pub line_thickness: f64,
    /// When set, every particle uses this color instead of its sampled pixel.
    pub override_color: Option<Rgba8>,
    pub color_mode: ColorMode,
    pub sample_margin: SampleMargin,
    pub line_strategy: LineStrategy,
}

impl EngineConfig {
    /// Preset values for a surface of the given size.
    pub fn preset(preset: Preset, size: SurfaceSize) -> Self {
        match preset {
            Preset::Responsive => {
                let (density, base_radius) = if size.width < 600 {
                    (12, 6.0)
                } else if size.width < 1000 {
                    (20, 10.0)
                } else {
                    (30, 15.0)
                };
                Self {
                    density,
                    line_draw_distance: 1.0,
                    base_radius,
                    max_line_thickness: 10.0,
                    reaction_sensitivity: 5.0,
                    line_thickness: 100.0,
                    override_color: None,
                    color_mode: ColorMode::Sampled,
                    sample_margin: SampleMargin::Fraction(0.1),
                    line_strategy: LineStrategy::BruteForce,
                }
            }
            Preset::Fixed => Self {
                density: 16,
                line_draw_distance: 24.0,
                base_radius: 4.0,
                max_line_thickness: 4.0,
                reaction_sensitivity: 3.0,
                line_thickness: 1.0,
                override_color: None,
                color_mode: ColorMode::Sampled,
                sample_margin: SampleMargin::Pixels(100.0),
                line_strategy: LineStrategy::BruteForce,
            },
        }
    }

    pub fn validate(&self) -> StippleResult<()> {
        if self.density == 0 {
            return Err(StippleError::validation("density must be > 0"));
        }
        let positive = [
            ("line_draw_distance", self.line_draw_distance),
            ("base_radius", self.base_radius),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(StippleError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        let non_negative = [
            ("max_line_thickness", self.max_line_thickness),
            ("reaction_sensitivity", self.reaction_sensitivity),
            ("line_thickness", self.line_thickness),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(StippleError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        match self.sample_margin {
            SampleMargin::Fraction(f) if !(0.0..1.0).contains(&f) => {
                return Err(StippleError::validation(
                    "sample_margin fraction must be in [0, 1)",
                ));
            }
            SampleMargin::Pixels(px) if !px.is_finite() || px < 0.0 => {
                return Err(StippleError::validation(
                    "sample_margin pixels must be finite and >= 0",
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

/// Per-instance options, fixed at construction.
///
/// `None` tuning fields fall back to the preset value for the current surface size.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub preset: Preset,
    pub density: Option<u32>,
    pub line_draw_distance: Option<f64>,
    pub base_radius: Option<f64>,
    pub max_line_thickness: Option<f64>,
    pub reaction_sensitivity: Option<f64>,
    pub line_thickness: Option<f64>,
    pub sample_margin: Option<SampleMargin>,
    pub override_color: Option<Rgba8>,
    pub color_mode: ColorMode,
    pub line_strategy: LineStrategy,
    /// Run particle motion on the rayon pool.
    pub parallel: bool,
    /// Seed for the chaotic color generator.
    pub seed: u64,
}

impl EngineOptions {
    /// Resolve the tuning for a surface of the given size.
    pub fn config_for(&self, size: SurfaceSize) -> StippleResult<EngineConfig> {
        let mut cfg = EngineConfig::preset(self.preset, size);
        if let Some(v) = self.density {
            cfg.density = v;
        }
        if let Some(v) = self.line_draw_distance {
            cfg.line_draw_distance = v;
        }
        if let Some(v) = self.base_radius {
            cfg.base_radius = v;
        }
        if let Some(v) = self.max_line_thickness {
            cfg.max_line_thickness = v;
        }
        if let Some(v) = self.reaction_sensitivity {
            cfg.reaction_sensitivity = v;
        }
        if let Some(v) = self.line_thickness {
            cfg.line_thickness = v;
        }
        if let Some(v) = self.sample_margin {
            cfg.sample_margin = v;
        }
        cfg.override_color = self.override_color;
        cfg.color_mode = self.color_mode;
        cfg.line_strategy = self.line_strategy;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load options from a JSON document.
    pub fn from_json_str(s: &str) -> StippleResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| StippleError::validation(format!("invalid engine options JSON: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/config.rs"]
mod tests;
