use crate::engine::config::EngineConfig;
use crate::field::points::Particle;
use crate::foundation::error::StippleResult;
use crate::render::lines::{line_width, links};
use crate::render::surface::{Compositing, DrawSurface};

/// What one render pass drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub lines: usize,
    pub discs: usize,
}

/// Draw one full frame: clear, connective lines, then particle discs, then present.
///
/// Line enumeration is O(n²) with [`crate::LineStrategy::BruteForce`]; the grid strategy
/// connects the same pairs at the same widths.
pub fn render(
    surface: &mut dyn DrawSurface,
    particles: &[Particle],
    config: &EngineConfig,
) -> StippleResult<RenderStats> {
    surface.clear()?;
    surface.set_compositing(Compositing::Lighter);

    let mut stats = RenderStats::default();
    for link in links(particles, config.line_draw_distance, config.line_strategy) {
        let from = &particles[link.a];
        let to = &particles[link.b];
        surface.stroke_line(
            from.position(),
            to.position(),
            line_width(link.distance, config),
            from.color,
        )?;
        stats.lines += 1;
    }

    for p in particles {
        surface.fill_disc(p.position(), config.base_radius, p.color)?;
        stats.discs += 1;
    }

    surface.present()?;
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
