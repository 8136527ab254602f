use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Externally owned on/off switch for rendering.
///
/// While hidden the engine keeps ticking and updating particles but leaves the last drawn
/// frame on the surface. Clones share the same flag.
#[derive(Clone, Debug)]
pub struct VisibilityFlag(Arc<AtomicBool>);

impl Default for VisibilityFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

impl VisibilityFlag {
    pub fn new(visible: bool) -> Self {
        Self(Arc::new(AtomicBool::new(visible)))
    }

    pub fn is_visible(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set_visible(&self, visible: bool) {
        self.0.store(visible, Ordering::Relaxed);
    }
}
