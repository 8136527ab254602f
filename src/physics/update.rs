use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::engine::config::{ColorMode, EngineConfig};
use crate::field::points::Particle;
use crate::foundation::core::{Rgba8, Vec2};
use crate::input::pointer::PointerState;

/// Fraction of the gap to the rest position closed per frame.
pub const RELAXATION: f64 = 0.05;

/// Pointer distances below this are clamped so the impulse stays finite.
pub const MIN_POINTER_DISTANCE: f64 = 1.0;

/// Impulse magnitude for a pointer `dist` pixels away. Pressing doubles it.
pub fn pointer_force(dist: f64, pressed: bool, sensitivity: f64) -> f64 {
    let base = if pressed { 200.0 } else { 100.0 };
    sensitivity * base / dist.max(MIN_POINTER_DISTANCE)
}

/// Displacement pushing `p` directly away from the pointer.
pub fn impulse(p: &Particle, pointer: &PointerState, sensitivity: f64) -> Vec2 {
    if pointer.is_away() {
        return Vec2::ZERO;
    }
    let dx = p.x - pointer.x;
    let dy = p.y - pointer.y;
    let theta = dy.atan2(dx);
    let force = pointer_force(dx.hypot(dy), pointer.pressed, sensitivity);
    Vec2::new(theta.cos() * force, theta.sin() * force)
}

/// Advance one particle by a frame: pointer impulse plus relaxation toward rest.
pub fn step_particle(p: &mut Particle, pointer: &PointerState, sensitivity: f64) {
    let push = impulse(p, pointer, sensitivity);
    p.x += push.x + (p.rest_x() - p.x) * RELAXATION;
    p.y += push.y + (p.rest_y() - p.y) * RELAXATION;
}

/// Per-frame particle update.
pub struct PhysicsUpdater {
    rng: StdRng,
    parallel: bool,
}

impl PhysicsUpdater {
    pub fn new(seed: u64, parallel: bool) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            parallel,
        }
    }

    /// Update every particle in place. The whole set is done before this returns.
    pub fn step(&mut self, particles: &mut [Particle], pointer: &PointerState, config: &EngineConfig) {
        if config.color_mode == ColorMode::Chaotic {
            for p in particles.iter_mut() {
                p.color = Rgba8::opaque(self.rng.random(), self.rng.random(), self.rng.random());
            }
        }

        let sensitivity = config.reaction_sensitivity;
        if self.parallel {
            particles
                .par_iter_mut()
                .for_each(|p| step_particle(p, pointer, sensitivity));
        } else {
            for p in particles.iter_mut() {
                step_particle(p, pointer, sensitivity);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/physics/update.rs"]
mod tests;
