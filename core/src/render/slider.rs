use crate::math::InterpHelper;

/// Pixel bounds of the comparison container in pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerBounds {
    pub left: f32,
    pub width: f32,
}

impl ContainerBounds {
    pub fn new(left: f32, width: f32) -> Self {
        Self { left, width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

/// Split-view controller for the before/after comparison.
///
/// Holds a single split position in `[0, 100]`: the percentage of the
/// "after" layer revealed from the left edge. Position updates only apply
/// during an active drag session; a session started over the container
/// ends on release anywhere, so excursions outside the container clamp
/// instead of extrapolating.
#[derive(Debug, Clone)]
pub struct ComparisonSlider {
    position: f32,
    drag: DragState,
}

const RESET_POSITION: f32 = 50.0;

impl ComparisonSlider {
    pub fn new() -> Self {
        Self {
            position: RESET_POSITION,
            drag: DragState::Idle,
        }
    }

    /// Centers the split and ends any active session. Called on every
    /// fresh result render, after the result panel has taken layout.
    pub fn reset(&mut self) {
        self.position = RESET_POSITION;
        self.drag = DragState::Idle;
    }

    /// Split position as a percentage in `[0, 100]`.
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Fraction of the container width revealing the "after" layer.
    pub fn reveal_fraction(&self) -> f32 {
        self.position / 100.0
    }

    pub fn is_dragging(&self) -> bool {
        self.drag == DragState::Dragging
    }

    /// Starts a drag session. The position is left untouched so that a
    /// press does not make the boundary jump.
    pub fn begin_drag(&mut self) {
        self.drag = DragState::Dragging;
    }

    /// Ends the session regardless of where the pointer was released.
    pub fn end_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Maps a pointer x coordinate to a split position, clamped to the
    /// container. Idempotent for a fixed input and unchanged bounds.
    pub fn set_from_pointer_x(&mut self, client_x: f32, bounds: &ContainerBounds) {
        if bounds.width <= 0.0 {
            return;
        }
        let x = InterpHelper::clamp(client_x - bounds.left, 0.0, bounds.width);
        self.position = 100.0 * x / bounds.width;
    }

    /// Movement handler: a no-op outside an active drag session.
    /// Returns whether the position was updated.
    pub fn pointer_moved(&mut self, client_x: f32, bounds: &ContainerBounds) -> bool {
        if self.drag != DragState::Dragging {
            return false;
        }
        self.set_from_pointer_x(client_x, bounds);
        true
    }
}

impl Default for ComparisonSlider {
    fn default() -> Self {
        Self::new()
    }
}
