//! egui painting for the overlay

use egui::{pos2, Align2, Color32, FontId, Painter, Pos2, Rect, Stroke};

/// Height of the hint bar along the bottom edge, in points
const INFO_BAR_HEIGHT: f32 = 32.0;

const SHADE_RGB: (u8, u8, u8) = (28, 28, 28);
const OUTLINE_WIDTH: f32 = 3.0;

/// Dimming colour for the given opacity in `0.0..=1.0`
pub fn shade_color(opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(SHADE_RGB.0, SHADE_RGB.1, SHADE_RGB.2, alpha)
}

/// The four bands of `screen` around `selection` (top, bottom, left, right).
///
/// Painting only these leaves the selection itself undimmed.
pub fn shade_regions(screen: Rect, selection: Rect) -> [Rect; 4] {
    let sel = selection.intersect(screen);
    [
        Rect::from_min_max(screen.min, pos2(screen.max.x, sel.min.y)),
        Rect::from_min_max(pos2(screen.min.x, sel.max.y), screen.max),
        Rect::from_min_max(pos2(screen.min.x, sel.min.y), pos2(sel.min.x, sel.max.y)),
        Rect::from_min_max(pos2(sel.max.x, sel.min.y), pos2(screen.max.x, sel.max.y)),
    ]
}

/// Selection to draw, in points, with its size in screen pixels
#[derive(Debug, Clone, Copy)]
pub struct SelectionMarker {
    pub rect: Rect,
    pub width_px: u32,
    pub height_px: u32,
}

/// Paint one overlay frame
pub fn paint_overlay(painter: &Painter, screen: Rect, marker: Option<SelectionMarker>, opacity: f32) {
    let shade = shade_color(opacity);

    match marker {
        None => {
            painter.rect_filled(screen, 0.0, shade);
        }
        Some(marker) => {
            for band in shade_regions(screen, marker.rect) {
                if band.is_positive() {
                    painter.rect_filled(band, 0.0, shade);
                }
            }
            draw_selection(painter, &marker);
        }
    }

    draw_info_bar(painter, screen, marker.is_some());
}

fn draw_selection(painter: &Painter, marker: &SelectionMarker) {
    painter.rect_stroke(marker.rect, 0.0, Stroke::new(OUTLINE_WIDTH, Color32::RED));

    let label_pos: Pos2 = marker.rect.left_bottom() + egui::vec2(4.0, 4.0);
    painter.text(
        label_pos,
        Align2::LEFT_TOP,
        format!("{}x{}", marker.width_px, marker.height_px),
        FontId::proportional(14.0),
        Color32::WHITE,
    );
}

fn draw_info_bar(painter: &Painter, screen: Rect, dragging: bool) {
    let bar = Rect::from_min_max(pos2(screen.min.x, screen.max.y - INFO_BAR_HEIGHT), screen.max);
    painter.rect_filled(bar, 0.0, Color32::from_rgba_unmultiplied(51, 51, 51, 200));

    let text = if dragging {
        "Release to capture"
    } else {
        "Drag to select a region | Esc to cancel"
    };
    painter.text(
        pos2(bar.min.x + 10.0, bar.center().y),
        Align2::LEFT_CENTER,
        text,
        FontId::proportional(14.0),
        Color32::WHITE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(rect: Rect) -> f32 {
        if rect.is_positive() {
            rect.area()
        } else {
            0.0
        }
    }

    #[test]
    fn bands_cover_everything_but_the_selection() {
        let screen = Rect::from_min_max(pos2(0.0, 0.0), pos2(1000.0, 800.0));
        let selection = Rect::from_min_max(pos2(100.0, 200.0), pos2(400.0, 500.0));

        let shaded: f32 = shade_regions(screen, selection).into_iter().map(area).sum();
        assert_eq!(shaded, screen.area() - selection.area());

        for band in shade_regions(screen, selection) {
            assert!(!band.intersects(selection.shrink(0.5)));
        }
    }

    #[test]
    fn selection_past_the_edge_is_clipped() {
        let screen = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        let selection = Rect::from_min_max(pos2(50.0, 50.0), pos2(300.0, 300.0));

        let shaded: f32 = shade_regions(screen, selection).into_iter().map(area).sum();
        assert_eq!(shaded, 100.0 * 100.0 - 50.0 * 50.0);
    }

    #[test]
    fn shade_alpha_follows_opacity() {
        assert_eq!(shade_color(0.0).a(), 0);
        assert_eq!(shade_color(1.0).a(), 255);
        assert_eq!(shade_color(7.0).a(), 255);
        assert_eq!(shade_color(0.3).a(), 77);
    }
}
