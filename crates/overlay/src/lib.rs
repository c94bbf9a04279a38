//! Overlay module for Lil Snippy
//!
//! Full-screen, semi-transparent surface for drag-selecting a screen region.

pub mod render;
pub mod selection;
pub mod window;

pub use selection::{
    calc_selection_rect, is_valid_selection, DragSelection, PointerEvent, SelectionRect,
    MIN_SELECTION_SIZE,
};
pub use window::{OverlaySurface, ScreenMapper};

use capture::Rect;

/// Selection outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// User selected a region large enough to capture
    Region(Rect),
    /// User released with a region below the minimum size
    TooSmall(Rect),
    /// User cancelled
    Cancelled,
}
