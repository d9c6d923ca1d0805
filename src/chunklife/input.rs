//! Pointer-drag panning state, owned by the caller.
//!
//! Holds the drag anchor and the committed view target between frames. The
//! window layer feeds it the pointer position and the pan button state each
//! frame and applies the returned target to its camera.

use super::coords::WorldPos;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PanState {
    dragging: bool,
    drag_start: WorldPos,
    target: WorldPos,
}

impl PanState {
    pub fn new(target: WorldPos) -> Self {
        Self {
            dragging: false,
            drag_start: WorldPos::default(),
            target,
        }
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Committed target (as of the last release).
    #[inline]
    pub fn target(&self) -> WorldPos {
        self.target
    }

    /// Advance one frame and return the target the view should use now.
    /// Dragging moves the view opposite to the pointer.
    pub fn update(&mut self, pointer: WorldPos, button_down: bool) -> WorldPos {
        if !self.dragging && button_down {
            self.drag_start = pointer;
            self.dragging = true;
        }
        if !self.dragging {
            return self.target;
        }

        let live = WorldPos::new(
            self.target.x + (self.drag_start.x - pointer.x),
            self.target.y + (self.drag_start.y - pointer.y),
        );
        if !button_down {
            self.target = live;
            self.dragging = false;
        }
        live
    }
}
