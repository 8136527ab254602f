/// Coordinate used on both axes while no pointer is over the surface.
pub const POINTER_AWAY: f64 = -1000.0;

/// Pointer position in surface-local pixels plus button state.
///
/// Written only by input handling; the physics step reads it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub x: f64,
    pub y: f64,
    pub pressed: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::away()
    }
}

impl PointerState {
    pub fn away() -> Self {
        Self {
            x: POINTER_AWAY,
            y: POINTER_AWAY,
            pressed: false,
        }
    }

    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressed: false,
        }
    }

    pub fn pressed_at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressed: true,
        }
    }

    /// True until the pointer first moves over the surface, and again after it leaves.
    pub fn is_away(&self) -> bool {
        self.x == POINTER_AWAY && self.y == POINTER_AWAY
    }

    pub(crate) fn move_to(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.x = x;
            self.y = y;
        }
    }

    pub(crate) fn leave(&mut self) {
        *self = Self::away();
    }
}
