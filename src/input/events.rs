use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};

use crate::foundation::core::SurfaceSize;
use crate::input::pointer::PointerState;

/// Capacity of the per-instance event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Messages delivered to an engine between frames.
#[derive(Debug)]
pub enum EngineEvent {
    /// Pointer moved to surface-local coordinates.
    PointerMove { x: f64, y: f64 },
    PointerDown,
    PointerUp,
    /// Pointer left the surface.
    PointerLeave,
    /// The container was measured at a new size.
    Resize(SurfaceSize),
}

impl EngineEvent {
    /// Fold a pointer event into `pointer`. Returns false for non-pointer events.
    pub(crate) fn apply_to_pointer(&self, pointer: &mut PointerState) -> bool {
        match *self {
            Self::PointerMove { x, y } => pointer.move_to(x, y),
            Self::PointerDown => pointer.pressed = true,
            Self::PointerUp => pointer.pressed = false,
            Self::PointerLeave => pointer.leave(),
            Self::Resize(_) => return false,
        }
        true
    }
}

/// Cloneable handle the host uses to deliver events to one engine instance.
///
/// Once the engine is cancelled (or dropped) every post is rejected.
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: SyncSender<EngineEvent>,
}

impl EventSender {
    /// Non-blocking post. Returns false if the queue is full or the engine is gone.
    pub fn post(&self, event: EngineEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(ev)) => {
                tracing::warn!(event = ?ev, "engine event queue full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Blocking post for producers running off the engine thread.
    pub fn post_blocking(&self, event: EngineEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn pointer_move(&self, x: f64, y: f64) -> bool {
        self.post(EngineEvent::PointerMove { x, y })
    }

    pub fn pointer_down(&self) -> bool {
        self.post(EngineEvent::PointerDown)
    }

    pub fn pointer_up(&self) -> bool {
        self.post(EngineEvent::PointerUp)
    }

    pub fn pointer_leave(&self) -> bool {
        self.post(EngineEvent::PointerLeave)
    }

    pub fn resize(&self, size: SurfaceSize) -> bool {
        self.post(EngineEvent::Resize(size))
    }
}

pub(crate) fn event_channel() -> (EventSender, Receiver<EngineEvent>) {
    let (tx, rx) = sync_channel(EVENT_CHANNEL_CAPACITY);
    (EventSender { tx }, rx)
}

#[cfg(test)]
#[path = "../../tests/unit/input/events.rs"]
mod tests;
