//! Turn an image into an animated field of point particles that react to a pointer.
//!
//! The image is sampled on a regular grid; every non-background sample becomes a particle
//! that is pushed away from the pointer and springs back to where it was sampled. Particles
//! are drawn as discs, and nearby pairs are joined by lines whose width falls off with
//! distance.
//!
//! An [`Engine`] binds one image to one [`DrawSurface`]. Hosts supply the surface, a
//! [`FrameScheduler`] and pointer/resize input through an [`EventSender`]:
//!
//! ```no_run
//! use stipple::{
//!     CpuSurface, Engine, EngineOptions, HeadlessScheduler, ImageSource, PointerScript,
//!     SurfaceSize, run_headless,
//! };
//!
//! # fn main() -> stipple::StippleResult<()> {
//! let surface = CpuSurface::new(SurfaceSize::new(800, 600))?;
//! let mut engine = Engine::new(
//!     surface,
//!     HeadlessScheduler::new(),
//!     ImageSource::from_path("logo.png"),
//!     EngineOptions::default(),
//! )?;
//! run_headless(&mut engine, 60, PointerScript::Idle, |_, _, _| Ok(()))?;
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod engine;
mod field;
mod foundation;
mod host;
mod input;
mod physics;
mod render;
mod sampling;

pub use engine::config::{
    ColorMode, EngineConfig, EngineOptions, LineStrategy, Preset, SampleMargin,
};
pub use engine::controller::{Engine, EngineState, TickOutcome};
pub use engine::decoder::{DecodeSender, ImageDecoder, InlineDecoder, ThreadDecoder};
pub use engine::schedule::{FrameHandle, FrameScheduler, HeadlessScheduler};
pub use engine::visibility::VisibilityFlag;
pub use field::points::{NEAR_WHITE, Particle, build as build_particles};
pub use foundation::core::{Point, Rgba8, SurfaceSize, Vec2};
pub use foundation::error::{StippleError, StippleResult};
pub use host::headless::{HeadlessReport, PointerScript, run_headless};
#[cfg(feature = "window")]
pub use host::window::run_window;
pub use input::events::{EVENT_CHANNEL_CAPACITY, EngineEvent, EventSender};
pub use input::pointer::{POINTER_AWAY, PointerState};
pub use physics::update::{MIN_POINTER_DISTANCE, PhysicsUpdater, RELAXATION};
pub use render::cpu::CpuSurface;
pub use render::lines::{Link, line_width, links};
pub use render::renderer::{RenderStats, render};
pub use render::surface::{Compositing, DrawCommand, DrawSurface, FrameRGBA, RecordingSurface};
pub use sampling::decode::{DecodedImage, ImageSource, decode_image, load_source};
pub use sampling::pixels::{PixelBuffer, fit_size, sample};
