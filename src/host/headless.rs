use std::f64::consts::TAU;
use std::time::Duration;

use crate::engine::controller::{Engine, EngineState, TickOutcome};
use crate::engine::schedule::HeadlessScheduler;
use crate::foundation::core::SurfaceSize;
use crate::foundation::error::StippleResult;
use crate::render::surface::DrawSurface;

const DECODE_POLL: Duration = Duration::from_millis(1);

/// Pointer input synthesized for headless runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PointerScript {
    /// No pointer over the surface.
    #[default]
    Idle,
    /// Circle the surface center. The button is held for the second half of each lap.
    Orbit {
        /// Radius as a fraction of the shorter surface side.
        radius: f64,
        /// Frames per lap.
        period: u64,
    },
}

impl PointerScript {
    /// Pointer position and button state for `frame`, or `None` when the pointer is away.
    pub fn at(&self, frame: u64, size: SurfaceSize) -> Option<(f64, f64, bool)> {
        match *self {
            Self::Idle => None,
            Self::Orbit { radius, period } => {
                let period = period.max(1);
                let phase = (frame % period) as f64 / period as f64;
                let (w, h) = (f64::from(size.width), f64::from(size.height));
                let r = w.min(h) * radius;
                let angle = phase * TAU;
                Some((
                    w / 2.0 + r * angle.cos(),
                    h / 2.0 + r * angle.sin(),
                    phase >= 0.5,
                ))
            }
        }
    }
}

/// Totals from one headless run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeadlessReport {
    pub ticks: u64,
    pub rendered: u64,
    pub particles: usize,
    pub lines_drawn: u64,
}

/// Drive `engine` for up to `frames` ticks, feeding pointer input from `script`.
///
/// `on_frame` sees the surface right after each tick. While the image is still decoding the
/// driver waits for it. The run ends early on a zero-area surface or once the engine is
/// cancelled or failed.
#[tracing::instrument(skip(engine, on_frame))]
pub fn run_headless<S, H>(
    engine: &mut Engine<S, HeadlessScheduler>,
    frames: u64,
    script: PointerScript,
    mut on_frame: H,
) -> StippleResult<HeadlessReport>
where
    S: DrawSurface,
    H: FnMut(u64, &S, TickOutcome) -> StippleResult<()>,
{
    engine.init()?;
    engine.pump()?;

    let events = engine.events();
    let mut report = HeadlessReport {
        particles: engine.particles().len(),
        ..HeadlessReport::default()
    };
    let mut pressed = false;

    while report.ticks < frames {
        let due = engine.scheduler_mut().take_due();
        if due.is_empty() {
            if engine.state() == EngineState::Sampling && !engine.size().is_empty() {
                std::thread::sleep(DECODE_POLL);
                engine.pump()?;
                continue;
            }
            tracing::debug!(state = ?engine.state(), "no frame pending, stopping");
            break;
        }

        match script.at(report.ticks, engine.size()) {
            Some((x, y, down)) => {
                events.pointer_move(x, y);
                if down != pressed {
                    if down {
                        events.pointer_down();
                    } else {
                        events.pointer_up();
                    }
                    pressed = down;
                }
            }
            None if pressed => {
                events.pointer_up();
                events.pointer_leave();
                pressed = false;
            }
            None => {}
        }

        for handle in due {
            let outcome = engine.tick(handle);
            if outcome == TickOutcome::Ignored {
                continue;
            }
            if let TickOutcome::Rendered(stats) = outcome {
                report.rendered += 1;
                report.lines_drawn += stats.lines as u64;
            }
            on_frame(report.ticks, engine.surface(), outcome)?;
            report.ticks += 1;
        }
    }

    report.particles = engine.particles().len();
    tracing::info!(
        ticks = report.ticks,
        rendered = report.rendered,
        particles = report.particles,
        "headless run finished"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/host/headless.rs"]
mod tests;
