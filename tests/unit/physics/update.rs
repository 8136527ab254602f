use super::*;
use crate::engine::config::Preset;
use crate::foundation::core::SurfaceSize;

fn config() -> EngineConfig {
    EngineConfig::preset(Preset::Fixed, SurfaceSize::new(400, 300))
}

fn grid() -> Vec<Particle> {
    (0..5)
        .flat_map(|i| {
            (0..5).map(move |j| {
                Particle::new(j as f64 * 16.0, i as f64 * 16.0, Rgba8::opaque(9, 9, 9))
            })
        })
        .collect()
}

#[test]
fn pressed_force_is_exactly_double() {
    for dist in [0.0, 0.5, 1.0, 3.7, 42.0, 999.0] {
        for sensitivity in [1.0, 3.0, 5.0, 0.3] {
            assert_eq!(
                pointer_force(dist, true, sensitivity),
                2.0 * pointer_force(dist, false, sensitivity)
            );
        }
    }

    let p = Particle::new(50.0, 40.0, Rgba8::opaque(0, 0, 0));
    let released = impulse(&p, &PointerState::at(47.0, 36.0), 3.0);
    let pressed = impulse(&p, &PointerState::pressed_at(47.0, 36.0), 3.0);
    assert_eq!(pressed.x, 2.0 * released.x);
    assert_eq!(pressed.y, 2.0 * released.y);
    assert!((released.length() - 3.0 * 100.0 / 5.0).abs() < 1e-9);
}

#[test]
fn impulse_points_away_from_pointer() {
    let p = Particle::new(10.0, 10.0, Rgba8::opaque(0, 0, 0));
    let push = impulse(&p, &PointerState::at(0.0, 10.0), 1.0);
    assert!(push.x > 0.0);
    assert!(push.y.abs() < 1e-12);

    let push = impulse(&p, &PointerState::at(10.0, 30.0), 1.0);
    assert!(push.y < 0.0);
}

#[test]
fn coincident_pointer_stays_finite() {
    let mut p = Particle::new(20.0, 20.0, Rgba8::opaque(0, 0, 0));
    let pointer = PointerState::pressed_at(20.0, 20.0);
    step_particle(&mut p, &pointer, 5.0);
    assert!(p.x.is_finite() && p.y.is_finite());
    assert!((p.displacement() - pointer_force(0.0, true, 5.0)).abs() < 1e-9);
}

#[test]
fn away_pointer_applies_no_impulse() {
    let p = Particle::new(0.0, 0.0, Rgba8::opaque(0, 0, 0));
    assert_eq!(impulse(&p, &PointerState::away(), 5.0), Vec2::ZERO);
}

fn scatter(particles: &mut [Particle]) {
    for (k, p) in particles.iter_mut().enumerate() {
        p.x += 30.0 - k as f64;
        p.y -= 12.0 + k as f64 * 0.5;
    }
}

#[test]
fn relaxation_converges_monotonically() {
    let cfg = config();
    let mut particles = grid();
    scatter(&mut particles);

    let mut updater = PhysicsUpdater::new(1, false);
    let pointer = PointerState::away();
    let mut last: Vec<f64> = particles.iter().map(Particle::displacement).collect();
    for _ in 0..400 {
        updater.step(&mut particles, &pointer, &cfg);
        let now: Vec<f64> = particles.iter().map(Particle::displacement).collect();
        for (a, b) in now.iter().zip(&last) {
            assert!(a <= b, "displacement grew from {b} to {a}");
        }
        last = now;
    }
    assert!(last.iter().all(|&d| d < 1e-6), "not settled: {last:?}");
}

#[test]
fn distant_pointer_settles_near_rest() {
    let cfg = config();
    let mut particles = grid();
    scatter(&mut particles);

    let mut updater = PhysicsUpdater::new(1, false);
    let pointer = PointerState::at(1.0e7, 1.0e7);
    for _ in 0..400 {
        updater.step(&mut particles, &pointer, &cfg);
    }
    assert!(particles.iter().all(|p| p.displacement() < 1e-3));
}

#[test]
fn rest_position_never_moves() {
    let cfg = config();
    let mut particles = grid();
    let rests: Vec<_> = particles.iter().map(Particle::rest).collect();
    let mut updater = PhysicsUpdater::new(7, false);
    for k in 0..20 {
        let pointer = PointerState::pressed_at(k as f64 * 3.0, 32.0);
        updater.step(&mut particles, &pointer, &cfg);
    }
    let after: Vec<_> = particles.iter().map(Particle::rest).collect();
    assert_eq!(rests, after);
}

#[test]
fn sampled_mode_keeps_colors_and_chaotic_mode_recolors() {
    let mut cfg = config();
    let mut particles = grid();
    let mut updater = PhysicsUpdater::new(3, false);
    updater.step(&mut particles, &PointerState::away(), &cfg);
    assert!(particles.iter().all(|p| p.color == Rgba8::opaque(9, 9, 9)));

    cfg.color_mode = ColorMode::Chaotic;
    updater.step(&mut particles, &PointerState::away(), &cfg);
    assert!(particles.iter().all(|p| p.color.a == 255));
    assert!(particles.iter().any(|p| p.color != Rgba8::opaque(9, 9, 9)));
}

#[test]
fn parallel_step_matches_sequential() {
    let cfg = config();
    let mut seq = grid();
    let mut par = grid();
    let mut a = PhysicsUpdater::new(0, false);
    let mut b = PhysicsUpdater::new(0, true);
    for k in 0..10 {
        let pointer = PointerState::at(20.0 + k as f64, 25.0);
        a.step(&mut seq, &pointer, &cfg);
        b.step(&mut par, &pointer, &cfg);
    }
    assert_eq!(seq, par);
}
