use std::sync::mpsc::{Receiver, TryRecvError};

use crate::engine::config::{EngineConfig, EngineOptions};
use crate::engine::decoder::{ImageDecoder, InlineDecoder, decode_channel};
use crate::engine::schedule::{FrameHandle, FrameScheduler};
use crate::engine::visibility::VisibilityFlag;
use crate::field::points::{self, Particle};
use crate::foundation::core::SurfaceSize;
use crate::foundation::error::{StippleError, StippleResult};
use crate::input::events::{EngineEvent, EventSender, event_channel};
use crate::input::pointer::PointerState;
use crate::physics::update::PhysicsUpdater;
use crate::render::renderer::{RenderStats, render};
use crate::render::surface::DrawSurface;
use crate::sampling::decode::{DecodedImage, ImageSource};
use crate::sampling::pixels::sample;

/// Lifecycle of one engine instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed; `init` not called yet.
    Uninitialized,
    /// Waiting for the image decode, or for a non-empty surface.
    Sampling,
    /// Particles built; one frame is always pending.
    Running,
    /// Transient while a resize rebuilds the field.
    Resizing,
    /// Terminal. No further frames run.
    Cancelled,
    /// Terminal. The image could not be decoded.
    Failed,
}

/// What a call to [`Engine::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale handle, or the engine is not running.
    Ignored,
    /// A resize was applied; this tick's work was skipped.
    Resampled,
    /// Physics ran but drawing is paused by the visibility flag.
    Hidden,
    Rendered(RenderStats),
    /// Physics ran but a draw call failed; the loop keeps going.
    RenderFailed,
}

/// One animated particle field bound to a drawing surface.
///
/// The engine is single-threaded and host-driven: the host posts input through
/// [`Engine::events`], calls [`Engine::pump`] between frames and [`Engine::tick`] when a
/// requested frame fires.
pub struct Engine<S: DrawSurface, F: FrameScheduler> {
    surface: S,
    scheduler: F,
    decoder: Box<dyn ImageDecoder>,
    source: ImageSource,
    options: EngineOptions,
    config: EngineConfig,
    size: SurfaceSize,
    state: EngineState,
    image: Option<DecodedImage>,
    particles: Vec<Particle>,
    pointer: PointerState,
    physics: PhysicsUpdater,
    visibility: Option<VisibilityFlag>,
    tx: EventSender,
    rx: Option<Receiver<EngineEvent>>,
    decoded: Option<Receiver<StippleResult<DecodedImage>>>,
    pending: Option<FrameHandle>,
    generation: u64,
    frames_ticked: u64,
    frames_rendered: u64,
}

impl<S: DrawSurface, F: FrameScheduler> Engine<S, F> {
    /// Bind an engine to `surface`. Fails if `options` do not resolve to a valid tuning.
    pub fn new(
        surface: S,
        scheduler: F,
        source: ImageSource,
        options: EngineOptions,
    ) -> StippleResult<Self> {
        let size = surface.size();
        let config = options.config_for(size)?;
        let (tx, rx) = event_channel();
        Ok(Self {
            surface,
            scheduler,
            decoder: Box::new(InlineDecoder),
            source,
            physics: PhysicsUpdater::new(options.seed, options.parallel),
            options,
            config,
            size,
            state: EngineState::Uninitialized,
            image: None,
            particles: Vec::new(),
            pointer: PointerState::away(),
            visibility: None,
            tx,
            rx: Some(rx),
            decoded: None,
            pending: None,
            generation: 0,
            frames_ticked: 0,
            frames_rendered: 0,
        })
    }

    pub fn with_decoder(mut self, decoder: Box<dyn ImageDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_visibility(mut self, flag: VisibilityFlag) -> Self {
        self.visibility = Some(flag);
        self
    }

    /// Start decoding the image. Calling it again is a no-op.
    #[tracing::instrument(skip(self))]
    pub fn init(&mut self) -> StippleResult<()> {
        if self.state != EngineState::Uninitialized {
            tracing::debug!(state = ?self.state, "init called twice, ignoring");
            return Ok(());
        }
        self.size = self.surface.size();
        self.config = self.options.config_for(self.size)?;
        self.state = EngineState::Sampling;
        let (done, decoded) = decode_channel();
        self.decoded = Some(decoded);
        self.decoder.decode(self.source.clone(), done);
        Ok(())
    }

    /// Pick up a finished decode, then drain queued events.
    ///
    /// Returns the decode error once if the image failed to load.
    pub fn pump(&mut self) -> StippleResult<()> {
        if self.rx.is_none() {
            return Ok(());
        }

        let mut failure = None;
        match self.poll_decode() {
            Some(Ok(image)) => self.apply_decoded(image),
            Some(Err(e)) => {
                tracing::error!(error = %e, "image decode failed");
                self.fail();
                failure = Some(e);
            }
            None => {}
        }

        let events: Vec<EngineEvent> = match self.rx.as_ref() {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        };
        for ev in events {
            if ev.apply_to_pointer(&mut self.pointer) {
                continue;
            }
            if let EngineEvent::Resize(size) = ev {
                self.apply_resize(size);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn poll_decode(&mut self) -> Option<StippleResult<DecodedImage>> {
        let result = match self.decoded.as_ref()?.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(StippleError::decode(
                "decoder finished without producing a result",
            )),
        };
        self.decoded = None;
        Some(result)
    }

    /// Run the frame identified by `handle`.
    ///
    /// The next frame is requested before any work so a failing draw cannot stop the loop.
    pub fn tick(&mut self, handle: FrameHandle) -> TickOutcome {
        if self.state != EngineState::Running || self.pending != Some(handle) {
            return TickOutcome::Ignored;
        }
        self.pending = Some(self.scheduler.request_frame());
        self.frames_ticked += 1;
        tracing::trace!(frame = self.frames_ticked, "tick");

        let generation = self.generation;
        if let Err(e) = self.pump() {
            tracing::warn!(error = %e, "event error during tick");
        }
        if self.state != EngineState::Running || self.generation != generation {
            return TickOutcome::Resampled;
        }

        self.physics
            .step(&mut self.particles, &self.pointer, &self.config);

        if self.visibility.as_ref().is_some_and(|v| !v.is_visible()) {
            return TickOutcome::Hidden;
        }
        match render(&mut self.surface, &self.particles, &self.config) {
            Ok(stats) => {
                self.frames_rendered += 1;
                TickOutcome::Rendered(stats)
            }
            Err(e) => {
                tracing::warn!(error = %e, "frame draw failed");
                TickOutcome::RenderFailed
            }
        }
    }

    /// Stop the loop and detach from the event source. Safe to call at any time, repeatedly.
    pub fn cancel(&mut self) {
        if self.state == EngineState::Cancelled {
            return;
        }
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.rx = None;
        self.decoded = None;
        self.state = EngineState::Cancelled;
        tracing::debug!(frames = self.frames_ticked, "engine cancelled");
    }

    fn apply_decoded(&mut self, image: DecodedImage) {
        if self.state != EngineState::Sampling {
            tracing::debug!(state = ?self.state, "late decode result ignored");
            return;
        }
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            "image decoded"
        );
        self.image = Some(image);
        self.rebuild();
    }

    fn apply_resize(&mut self, size: SurfaceSize) {
        match self.state {
            EngineState::Cancelled | EngineState::Failed => return,
            EngineState::Uninitialized => {
                if let Err(e) = self.surface.resize(size) {
                    tracing::warn!(error = %e, "surface resize failed");
                }
                self.size = self.surface.size();
                return;
            }
            _ => {}
        }
        tracing::debug!(width = size.width, height = size.height, "resize");
        self.state = EngineState::Resizing;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        if let Err(e) = self.surface.resize(size) {
            tracing::warn!(error = %e, "surface resize failed");
        }
        self.size = self.surface.size();
        match self.options.config_for(self.size) {
            Ok(cfg) => self.config = cfg,
            Err(e) => tracing::warn!(error = %e, "keeping previous tuning after resize"),
        }
        if self.image.is_some() {
            self.rebuild();
        } else {
            self.state = EngineState::Sampling;
        }
    }

    /// Resample the image for the current size and replace the particle set.
    #[tracing::instrument(skip(self), fields(width = self.size.width, height = self.size.height))]
    fn rebuild(&mut self) {
        let Some(image) = self.image.as_ref() else {
            return;
        };
        self.generation += 1;
        let Some(buffer) = sample(image, self.size, self.config.sample_margin) else {
            tracing::warn!("surface has zero area, waiting for a resize");
            self.particles.clear();
            self.state = EngineState::Sampling;
            return;
        };
        self.particles = points::build(&buffer, &self.config);
        tracing::debug!(
            particles = self.particles.len(),
            generation = self.generation,
            "field built"
        );
        self.state = EngineState::Running;
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    fn fail(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.particles.clear();
        self.state = EngineState::Failed;
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    /// Tuning of the current sampling generation.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Sender for host input. Posts are rejected after [`Engine::cancel`].
    pub fn events(&self) -> EventSender {
        self.tx.clone()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    /// The frame the engine is waiting on, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Number of sampling generations built so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frames_ticked(&self) -> u64 {
        self.frames_ticked
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

impl<S: DrawSurface, F: FrameScheduler> Drop for Engine<S, F> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/controller.rs"]
mod tests;
