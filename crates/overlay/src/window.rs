//! Overlay surface: the main viewport switched into full-screen selection mode

use crate::{
    render::{paint_overlay, SelectionMarker},
    selection::{is_valid_selection, DragSelection, PointerEvent, SelectionRect},
    SelectionOutcome,
};
use egui::{CentralPanel, Context, CursorIcon, Frame, Key, Pos2, ViewportCommand, WindowLevel};
use tracing::debug;

/// Converts between egui points inside the viewport and screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMapper {
    origin: Pos2,
    pixels_per_point: f32,
}

impl ScreenMapper {
    /// `origin` is the viewport's top-left corner on screen, in points
    pub fn new(origin: Pos2, pixels_per_point: f32) -> Self {
        Self {
            origin,
            pixels_per_point: if pixels_per_point > 0.0 { pixels_per_point } else { 1.0 },
        }
    }

    /// Some platforms (Wayland) never report the window position; a
    /// full-screen surface there starts at the screen origin.
    pub fn from_ctx(ctx: &Context) -> Self {
        let origin = ctx
            .input(|i| i.viewport().inner_rect.map(|r| r.min))
            .unwrap_or(Pos2::ZERO);
        Self::new(origin, ctx.pixels_per_point())
    }

    pub fn to_screen(&self, pos: Pos2) -> PointerEvent {
        PointerEvent::new(
            ((self.origin.x + pos.x) * self.pixels_per_point).round() as i32,
            ((self.origin.y + pos.y) * self.pixels_per_point).round() as i32,
        )
    }

    pub fn to_local(&self, selection: SelectionRect) -> egui::Rect {
        let point = |x: i32, y: i32| {
            Pos2::new(
                x as f32 / self.pixels_per_point - self.origin.x,
                y as f32 / self.pixels_per_point - self.origin.y,
            )
        };
        egui::Rect::from_two_pos(point(selection.x1, selection.y1), point(selection.x2, selection.y2))
    }
}

/// Pointer state sampled once per frame
#[derive(Debug, Default, Clone, Copy)]
struct FrameInput {
    escape: bool,
    pressed: bool,
    down: bool,
    released: bool,
    pos: Option<Pos2>,
}

/// Drag-to-select surface
pub struct OverlaySurface {
    drag: DragSelection,
    min_size: u32,
    opacity: f32,
}

impl OverlaySurface {
    pub fn new(min_size: u32, opacity: f32) -> Self {
        Self {
            drag: DragSelection::new(),
            min_size,
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    /// Turn the main window into the overlay
    pub fn enter(&mut self, ctx: &Context) {
        self.drag.reset();
        ctx.send_viewport_cmd(ViewportCommand::Decorations(false));
        ctx.send_viewport_cmd(ViewportCommand::WindowLevel(WindowLevel::AlwaysOnTop));
        ctx.send_viewport_cmd(ViewportCommand::Fullscreen(true));
        ctx.send_viewport_cmd(ViewportCommand::Focus);
    }

    /// Restore the normal window
    pub fn exit(&mut self, ctx: &Context) {
        self.drag.reset();
        ctx.send_viewport_cmd(ViewportCommand::Fullscreen(false));
        ctx.send_viewport_cmd(ViewportCommand::WindowLevel(WindowLevel::Normal));
        ctx.send_viewport_cmd(ViewportCommand::Decorations(true));
    }

    /// Paint nothing so the screen shows through while it is being captured
    pub fn show_cleared(&self, ctx: &Context) {
        CentralPanel::default().frame(Frame::none()).show(ctx, |_ui| {});
    }

    /// Run one overlay frame; returns the outcome once the gesture ends
    pub fn show(&mut self, ctx: &Context) -> Option<SelectionOutcome> {
        ctx.set_cursor_icon(CursorIcon::Crosshair);

        let mapper = ScreenMapper::from_ctx(ctx);
        let input = ctx.input(|i| FrameInput {
            escape: i.key_pressed(Key::Escape),
            pressed: i.pointer.primary_pressed(),
            down: i.pointer.primary_down(),
            released: i.pointer.primary_released(),
            pos: i.pointer.interact_pos(),
        });

        let outcome = self.handle_input(&mapper, input);

        let marker = self.drag.current().map(|selection| {
            let normalized = selection.normalized();
            SelectionMarker {
                rect: mapper.to_local(normalized),
                width_px: normalized.width(),
                height_px: normalized.height(),
            }
        });

        CentralPanel::default().frame(Frame::none()).show(ctx, |ui| {
            paint_overlay(ui.painter(), ui.max_rect(), marker, self.opacity);
        });

        outcome
    }

    fn handle_input(&mut self, mapper: &ScreenMapper, input: FrameInput) -> Option<SelectionOutcome> {
        if input.escape {
            self.drag.reset();
            return Some(SelectionOutcome::Cancelled);
        }

        let point = mapper.to_screen(input.pos?);

        if input.pressed {
            self.drag.press(point);
        } else if input.down {
            self.drag.drag(point);
        }

        if !input.released {
            return None;
        }

        let selection = self.drag.release(point)?;
        debug!(
            x1 = selection.x1,
            y1 = selection.y1,
            x2 = selection.x2,
            y2 = selection.y2,
            "Selection released"
        );

        let rect = selection.to_rect();
        if is_valid_selection(&rect, self.min_size) {
            Some(SelectionOutcome::Region(rect))
        } else {
            Some(SelectionOutcome::TooSmall(rect))
        }
    }
}
