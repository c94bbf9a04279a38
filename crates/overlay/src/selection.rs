//! Selection logic for drag-to-select

use capture::Rect;

/// Minimum selection size
pub const MIN_SELECTION_SIZE: u32 = 4;

/// Pointer position in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub x: i32,
    pub y: i32,
}

impl PointerEvent {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Selection as two opposite corners; `(x1, y1)` is the anchor until normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl SelectionRect {
    /// Zero-size selection anchored at `point`
    pub fn at(point: PointerEvent) -> Self {
        Self {
            x1: point.x,
            y1: point.y,
            x2: point.x,
            y2: point.y,
        }
    }

    /// Same area with `x1 <= x2` and `y1 <= y2`
    pub fn normalized(&self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    pub fn width(&self) -> u32 {
        (self.x2 - self.x1).unsigned_abs()
    }

    pub fn height(&self) -> u32 {
        (self.y2 - self.y1).unsigned_abs()
    }

    pub fn to_rect(&self) -> Rect {
        calc_selection_rect(self.x1, self.y1, self.x2, self.y2)
    }
}

/// Calculate selection rectangle from drag points
pub fn calc_selection_rect(
    start_x: i32,
    start_y: i32,
    end_x: i32,
    end_y: i32,
) -> Rect {
    let x = start_x.min(end_x);
    let y = start_y.min(end_y);
    let width = (start_x - end_x).unsigned_abs();
    let height = (start_y - end_y).unsigned_abs();

    Rect::new(x, y, width, height)
}

/// Check if selection is large enough to capture. Zero-area is never valid.
pub fn is_valid_selection(rect: &Rect, min_size: u32) -> bool {
    let min_size = min_size.max(1);
    rect.width >= min_size && rect.height >= min_size
}

/// One press, drag, release gesture
#[derive(Debug, Default, Clone)]
pub struct DragSelection {
    current: Option<SelectionRect>,
}

impl DragSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the anchor and start a zero-size marker
    pub fn press(&mut self, point: PointerEvent) {
        self.current = Some(SelectionRect::at(point));
    }

    /// Stretch the marker from the anchor to `point`
    pub fn drag(&mut self, point: PointerEvent) {
        if let Some(selection) = self.current.as_mut() {
            selection.x2 = point.x;
            selection.y2 = point.y;
        }
    }

    /// Finish the gesture; `None` if no press was seen
    pub fn release(&mut self, point: PointerEvent) -> Option<SelectionRect> {
        self.drag(point);
        self.current.take().map(|selection| selection.normalized())
    }

    /// Marker as currently drawn, anchor first
    pub fn current(&self) -> Option<SelectionRect> {
        self.current
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}
