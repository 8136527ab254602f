use std::io::Cursor;
use std::time::{Duration, Instant};

use super::*;
use crate::engine::config::{Preset, SampleMargin};
use crate::engine::decoder::{DecodeSender, ThreadDecoder};
use crate::engine::schedule::HeadlessScheduler;
use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::StippleError;
use crate::input::events::EVENT_CHANNEL_CAPACITY;
use crate::render::surface::{Compositing, RecordingSurface};

type TestEngine = Engine<RecordingSurface, HeadlessScheduler>;

fn red_square_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(40, 40, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn options() -> EngineOptions {
    EngineOptions {
        preset: Preset::Fixed,
        density: Some(10),
        sample_margin: Some(SampleMargin::Fraction(0.0)),
        ..EngineOptions::default()
    }
}

fn engine(w: u32, h: u32) -> TestEngine {
    Engine::new(
        RecordingSurface::new(SurfaceSize::new(w, h)),
        HeadlessScheduler::new(),
        ImageSource::from_bytes(red_square_png()),
        options(),
    )
    .unwrap()
}

fn running(w: u32, h: u32) -> TestEngine {
    let mut e = engine(w, h);
    e.init().unwrap();
    e.pump().unwrap();
    assert_eq!(e.state(), EngineState::Running);
    e
}

fn tick_due(e: &mut TestEngine) -> TickOutcome {
    let handle = e.scheduler_mut().next_due().expect("a frame should be pending");
    e.tick(handle)
}

#[test]
fn init_builds_field_and_requests_first_frame() {
    let mut e = engine(100, 100);
    assert_eq!(e.state(), EngineState::Uninitialized);
    e.init().unwrap();
    assert_eq!(e.state(), EngineState::Sampling);
    e.pump().unwrap();

    assert_eq!(e.state(), EngineState::Running);
    // 40x40 image centered at (30, 30) on a 10px grid.
    assert_eq!(e.particles().len(), 16);
    assert!(e.particles().iter().all(|p| p.color == Rgba8::opaque(255, 0, 0)));
    assert_eq!(e.particles()[0].rest(), Point::new(30.0, 30.0));
    assert_eq!(e.scheduler().pending(), 1);
    assert_eq!(e.generation(), 1);
}

#[test]
fn init_twice_decodes_once() {
    let mut e = engine(100, 100);
    e.init().unwrap();
    e.init().unwrap();
    e.pump().unwrap();
    assert_eq!(e.generation(), 1);
    assert_eq!(e.scheduler().pending(), 1);
}

#[test]
fn tick_renders_and_keeps_exactly_one_frame_pending() {
    let mut e = running(100, 100);
    for n in 1..=3 {
        let TickOutcome::Rendered(stats) = tick_due(&mut e) else {
            panic!("expected a rendered frame");
        };
        assert_eq!(stats.discs, 16);
        assert!(stats.lines > 0);
        assert_eq!(e.scheduler().pending(), 1);
        assert_eq!(e.frames_ticked(), n);
        assert_eq!(e.frames_rendered(), n);
    }
    assert_eq!(e.surface().presented(), 3);
    assert_eq!(
        e.surface().commands()[1],
        crate::render::surface::DrawCommand::Compositing(Compositing::Lighter)
    );
}

#[test]
fn stale_handles_are_ignored() {
    let mut e = running(100, 100);
    let first = e.pending_frame().unwrap();
    assert!(matches!(tick_due(&mut e), TickOutcome::Rendered(_)));
    assert_eq!(e.tick(first), TickOutcome::Ignored);
    assert_eq!(e.frames_ticked(), 1);
}

#[test]
fn resting_field_stays_put_without_pointer() {
    let mut e = running(100, 100);
    for _ in 0..5 {
        tick_due(&mut e);
    }
    assert!(e.particles().iter().all(|p| p.displacement() == 0.0));
}

#[test]
fn pointer_input_pushes_nearby_particles() {
    let mut e = running(100, 100);
    assert!(e.events().pointer_move(45.0, 45.0));
    tick_due(&mut e);
    assert_eq!((e.pointer().x, e.pointer().y), (45.0, 45.0));
    assert!(e.particles().iter().any(|p| p.displacement() > 0.0));

    assert!(e.events().pointer_leave());
    e.pump().unwrap();
    assert!(e.pointer().is_away());
}

#[test]
fn cancel_before_init_makes_init_a_no_op() {
    let mut e = engine(100, 100);
    e.cancel();
    assert_eq!(e.state(), EngineState::Cancelled);
    e.init().unwrap();
    e.pump().unwrap();
    assert_eq!(e.state(), EngineState::Cancelled);
    assert!(e.particles().is_empty());
    assert_eq!(e.scheduler().pending(), 0);
}

#[test]
fn cancel_stops_the_loop_and_is_idempotent() {
    let mut e = running(100, 100);
    tick_due(&mut e);
    tick_due(&mut e);
    let last = e.pending_frame().unwrap();

    e.cancel();
    e.cancel();
    assert_eq!(e.state(), EngineState::Cancelled);
    assert_eq!(e.scheduler().pending(), 0);
    assert_eq!(e.pending_frame(), None);
    assert_eq!(e.tick(last), TickOutcome::Ignored);
    assert_eq!(e.frames_ticked(), 2);
}

#[test]
fn events_after_cancel_are_rejected() {
    let mut e = running(100, 100);
    let events = e.events();
    assert!(events.pointer_move(1.0, 1.0));
    e.cancel();
    assert!(!events.pointer_move(2.0, 2.0));
    assert!(!events.resize(SurfaceSize::new(10, 10)));
}

#[test]
fn resize_skips_the_tick_and_resamples() {
    let mut e = running(100, 100);
    tick_due(&mut e);

    assert!(e.events().resize(SurfaceSize::new(200, 200)));
    assert_eq!(tick_due(&mut e), TickOutcome::Resampled);
    assert_eq!(e.state(), EngineState::Running);
    assert_eq!(e.size(), SurfaceSize::new(200, 200));
    assert_eq!(e.surface().size(), SurfaceSize::new(200, 200));
    assert_eq!(e.generation(), 2);
    assert_eq!(e.scheduler().pending(), 1);

    assert_eq!(e.particles().len(), 16);
    let min_x = e
        .particles()
        .iter()
        .map(|p| p.rest_x())
        .fold(f64::INFINITY, f64::min);
    assert_eq!(min_x, 80.0);

    assert!(matches!(tick_due(&mut e), TickOutcome::Rendered(_)));
}

#[test]
fn zero_area_surface_waits_for_a_real_size() {
    let mut e = engine(0, 0);
    e.init().unwrap();
    e.pump().unwrap();
    assert_eq!(e.state(), EngineState::Sampling);
    assert!(e.particles().is_empty());
    assert_eq!(e.scheduler().pending(), 0);

    e.events().resize(SurfaceSize::new(100, 100));
    e.pump().unwrap();
    assert_eq!(e.state(), EngineState::Running);
    assert_eq!(e.particles().len(), 16);
    assert_eq!(e.scheduler().pending(), 1);
}

#[test]
fn resize_to_zero_pauses_until_resized_again() {
    let mut e = running(100, 100);
    e.events().resize(SurfaceSize::new(0, 0));
    assert_eq!(tick_due(&mut e), TickOutcome::Resampled);
    assert_eq!(e.state(), EngineState::Sampling);
    assert_eq!(e.scheduler().pending(), 0);

    e.events().resize(SurfaceSize::new(100, 100));
    e.pump().unwrap();
    assert_eq!(e.state(), EngineState::Running);
}

#[test]
fn decode_failure_is_terminal() {
    let mut e = Engine::new(
        RecordingSurface::new(SurfaceSize::new(100, 100)),
        HeadlessScheduler::new(),
        ImageSource::from_bytes(b"not an image".to_vec()),
        options(),
    )
    .unwrap();
    e.init().unwrap();
    let err = e.pump().unwrap_err();
    assert!(matches!(err, StippleError::Decode(_)));
    assert_eq!(e.state(), EngineState::Failed);
    assert_eq!(e.scheduler().pending(), 0);

    e.events().resize(SurfaceSize::new(50, 50));
    e.pump().unwrap();
    assert_eq!(e.state(), EngineState::Failed);
    assert_eq!(e.surface().size(), SurfaceSize::new(100, 100));
}

#[test]
fn invalid_options_fail_construction() {
    let bad = EngineOptions {
        density: Some(0),
        ..options()
    };
    let res = Engine::new(
        RecordingSurface::new(SurfaceSize::new(10, 10)),
        HeadlessScheduler::new(),
        ImageSource::from_bytes(red_square_png()),
        bad,
    );
    assert!(matches!(res, Err(StippleError::Validation(_))));
}

#[test]
fn hidden_engine_ticks_without_drawing() {
    let flag = VisibilityFlag::new(false);
    let mut e = engine(100, 100).with_visibility(flag.clone());
    e.init().unwrap();
    e.pump().unwrap();

    assert_eq!(tick_due(&mut e), TickOutcome::Hidden);
    assert_eq!(e.frames_ticked(), 1);
    assert_eq!(e.frames_rendered(), 0);
    assert_eq!(e.surface().presented(), 0);

    flag.set_visible(true);
    assert!(matches!(tick_due(&mut e), TickOutcome::Rendered(_)));
    assert_eq!(e.surface().presented(), 1);
}

struct BrokenSurface(SurfaceSize);

impl DrawSurface for BrokenSurface {
    fn size(&self) -> SurfaceSize {
        self.0
    }

    fn resize(&mut self, size: SurfaceSize) -> StippleResult<()> {
        self.0 = size;
        Ok(())
    }

    fn set_compositing(&mut self, _mode: Compositing) {}

    fn clear(&mut self) -> StippleResult<()> {
        Err(StippleError::render("surface lost"))
    }

    fn stroke_line(&mut self, _: Point, _: Point, _: f64, _: Rgba8) -> StippleResult<()> {
        Ok(())
    }

    fn fill_disc(&mut self, _: Point, _: f64, _: Rgba8) -> StippleResult<()> {
        Ok(())
    }

    fn present(&mut self) -> StippleResult<()> {
        Ok(())
    }
}

#[test]
fn draw_failures_do_not_stop_the_loop() {
    let mut e = Engine::new(
        BrokenSurface(SurfaceSize::new(100, 100)),
        HeadlessScheduler::new(),
        ImageSource::from_bytes(red_square_png()),
        options(),
    )
    .unwrap();
    e.init().unwrap();
    e.pump().unwrap();

    for _ in 0..2 {
        let h = e.scheduler_mut().next_due().unwrap();
        assert_eq!(e.tick(h), TickOutcome::RenderFailed);
        assert_eq!(e.scheduler().pending(), 1);
    }
    assert_eq!(e.frames_ticked(), 2);
    assert_eq!(e.frames_rendered(), 0);
}

#[test]
fn thread_decoder_delivers_on_a_later_pump() {
    let mut e = engine(100, 100).with_decoder(Box::new(ThreadDecoder));
    e.init().unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while e.state() == EngineState::Sampling && Instant::now() < deadline {
        e.pump().unwrap();
        std::thread::sleep(Duration::from_millis(2));
    }
    assert_eq!(e.state(), EngineState::Running);
    assert_eq!(e.particles().len(), 16);
}

#[test]
fn decode_result_survives_a_full_input_queue() {
    let mut e = engine(100, 100);
    let events = e.events();
    for i in 0..EVENT_CHANNEL_CAPACITY {
        assert!(events.pointer_move(i as f64, 0.0));
    }
    assert!(!events.pointer_move(-1.0, 0.0));

    e.init().unwrap();
    e.pump().unwrap();
    assert_eq!(e.state(), EngineState::Running);
    assert_eq!(e.particles().len(), 16);
    assert!(e.pending_frame().is_some());
    assert_eq!(e.pointer().x, (EVENT_CHANNEL_CAPACITY - 1) as f64);
}

struct SilentDecoder;

impl ImageDecoder for SilentDecoder {
    fn decode(&mut self, _source: ImageSource, done: DecodeSender) {
        drop(done);
    }
}

#[test]
fn decoder_that_never_delivers_fails_the_engine() {
    let mut e = engine(100, 100).with_decoder(Box::new(SilentDecoder));
    e.init().unwrap();
    let err = e.pump().unwrap_err();
    assert!(matches!(err, StippleError::Decode(_)));
    assert_eq!(e.state(), EngineState::Failed);
    e.pump().unwrap();
}
