use std::collections::HashMap;

use crate::engine::config::{EngineConfig, LineStrategy};
use crate::field::points::Particle;

/// Two particles close enough to be connected; `a < b` are indices into the particle slice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
}

fn distance(p: &Particle, q: &Particle) -> f64 {
    let dx = q.x - p.x;
    let dy = q.y - p.y;
    (dx * dx + dy * dy).sqrt()
}

/// Width of a connective line between particles `dist` apart: full at zero, zero at the threshold.
pub fn line_width(dist: f64, config: &EngineConfig) -> f64 {
    (1.0 - dist / config.line_draw_distance) * config.max_line_thickness * config.line_thickness
}

/// Every unordered pair within `max_dist`, ordered by `a` then `b`.
///
/// Both strategies return the same list; the grid only prunes candidates.
pub fn links(particles: &[Particle], max_dist: f64, strategy: LineStrategy) -> Vec<Link> {
    match strategy {
        LineStrategy::BruteForce => brute_force(particles, max_dist),
        LineStrategy::SpatialGrid => spatial_grid(particles, max_dist),
    }
}

fn brute_force(particles: &[Particle], max_dist: f64) -> Vec<Link> {
    let mut out = Vec::new();
    for (a, p) in particles.iter().enumerate() {
        for (b, q) in particles.iter().enumerate().skip(a + 1) {
            let d = distance(p, q);
            if d <= max_dist {
                out.push(Link { a, b, distance: d });
            }
        }
    }
    out
}

fn spatial_grid(particles: &[Particle], max_dist: f64) -> Vec<Link> {
    if !(max_dist.is_finite() && max_dist > 0.0) {
        return brute_force(particles, max_dist);
    }
    let cell_of = |p: &Particle| -> (i64, i64) {
        (
            (p.x / max_dist).floor() as i64,
            (p.y / max_dist).floor() as i64,
        )
    };

    let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, p) in particles.iter().enumerate() {
        cells.entry(cell_of(p)).or_default().push(i);
    }

    let mut out = Vec::new();
    let mut candidates = Vec::new();
    for (a, p) in particles.iter().enumerate() {
        let (cx, cy) = cell_of(p);
        candidates.clear();
        for ox in -1..=1 {
            for oy in -1..=1 {
                let key = (cx.saturating_add(ox), cy.saturating_add(oy));
                if let Some(members) = cells.get(&key) {
                    candidates.extend(members.iter().copied().filter(|&b| b > a));
                }
            }
        }
        candidates.sort_unstable();
        for &b in &candidates {
            let d = distance(p, &particles[b]);
            if d <= max_dist {
                out.push(Link { a, b, distance: d });
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/lines.rs"]
mod tests;
