mod button;

pub use button::Button;

// UI constants - functions for responsive layout
use macroquad::prelude::{Rect, screen_height, screen_width};

pub const PANEL_WIDTH: f32 = 180.0;
pub const BUTTON_HEIGHT: f32 = 40.0;
pub const CELL_SIZE: f32 = 10.0;
pub const TITLE_BAR_HEIGHT: f32 = 20.0;

/// Gap between secondary view panels and the grid area edges
const VIEW_MARGIN: f32 = 10.0;
/// Share of the grid area height taken by the secondary view strip
const VIEW_STRIP_RATIO: f32 = 0.35;

/// Get the X position where the panel starts (right side)
pub fn panel_x() -> f32 {
    screen_width() - PANEL_WIDTH
}

/// Get the width of the grid area
pub fn grid_area_width() -> f32 {
    screen_width() - PANEL_WIDTH
}

/// Get the height of the grid area
pub fn grid_area_height() -> f32 {
    screen_height()
}

pub fn grid_area() -> Rect {
    Rect::new(0.0, 0.0, grid_area_width(), grid_area_height())
}

/// Screen regions of one secondary view window
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewPanel {
    pub frame: Rect,
    pub title_bar: Rect,
    /// Where the view's render target is drawn
    pub content: Rect,
    pub close_button: Rect,
}

impl ViewPanel {
    fn new(frame: Rect) -> Self {
        let title_bar = Rect::new(frame.x, frame.y, frame.w, TITLE_BAR_HEIGHT);
        let content = Rect::new(frame.x, frame.y + TITLE_BAR_HEIGHT, frame.w, frame.h - TITLE_BAR_HEIGHT);
        let close_button = Rect::new(
            frame.x + frame.w - TITLE_BAR_HEIGHT,
            frame.y,
            TITLE_BAR_HEIGHT,
            TITLE_BAR_HEIGHT,
        );
        Self {
            frame,
            title_bar,
            content,
            close_button,
        }
    }
}

/// Lay out `count` secondary views side by side along the bottom of `area`.
/// Panels keep `aspect_ratio` for their content and shrink to fit.
pub fn view_panels(area: Rect, count: usize, aspect_ratio: f32) -> Vec<ViewPanel> {
    if count == 0 {
        return Vec::new();
    }
    let n = count as f32;
    let max_content_h = area.h * VIEW_STRIP_RATIO - TITLE_BAR_HEIGHT;
    let max_w = (area.w - VIEW_MARGIN * (n + 1.0)) / n;
    let content_h = max_content_h.min(max_w / aspect_ratio).max(1.0);
    let w = content_h * aspect_ratio;
    let h = content_h + TITLE_BAR_HEIGHT;
    let y = area.y + area.h - h - VIEW_MARGIN;

    (0..count)
        .map(|i| {
            let x = area.x + VIEW_MARGIN + i as f32 * (w + VIEW_MARGIN);
            ViewPanel::new(Rect::new(x, y, w, h))
        })
        .collect()
}

/// Index of the panel under `pos`, topmost (newest) first
pub fn panel_at(panels: &[ViewPanel], pos: (f32, f32)) -> Option<usize> {
    let point = macroquad::math::vec2(pos.0, pos.1);
    panels.iter().rposition(|p| p.frame.contains(point))
}

/// Create UI buttons with standard layout
pub fn create_buttons() -> Vec<Button> {
    let px = panel_x();
    let labels = ["Open view", "Close view", "Follow", "Reset zoom", "Pause"];
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| Button::new(px, 20.0 + i as f32 * 50.0, PANEL_WIDTH, BUTTON_HEIGHT, *label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: Rect = Rect {
        x: 0.0,
        y: 0.0,
        w: 1000.0,
        h: 800.0,
    };

    #[test]
    fn test_no_views_no_panels() {
        assert!(view_panels(AREA, 0, 4.0 / 3.0).is_empty());
    }

    #[test]
    fn test_panels_fit_inside_area_without_overlap() {
        for count in 1..=6 {
            let panels = view_panels(AREA, count, 4.0 / 3.0);
            assert_eq!(panels.len(), count);
            for pair in panels.windows(2) {
                assert!(pair[0].frame.x + pair[0].frame.w <= pair[1].frame.x);
            }
            for p in &panels {
                assert!(p.frame.x >= AREA.x && p.frame.x + p.frame.w <= AREA.x + AREA.w);
                assert!(p.frame.y >= AREA.y && p.frame.y + p.frame.h <= AREA.y + AREA.h);
                assert!((p.content.w / p.content.h - 4.0 / 3.0).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_panel_regions() {
        let panel = view_panels(AREA, 1, 4.0 / 3.0)[0];
        assert_eq!(panel.title_bar.h, TITLE_BAR_HEIGHT);
        assert_eq!(panel.content.y, panel.frame.y + TITLE_BAR_HEIGHT);
        assert!(panel.title_bar.contains(panel.close_button.center()));
    }

    #[test]
    fn test_panel_at() {
        let panels = view_panels(AREA, 2, 4.0 / 3.0);
        let inside = panels[1].content.center();
        assert_eq!(panel_at(&panels, (inside.x, inside.y)), Some(1));
        assert_eq!(panel_at(&panels, (1.0, 1.0)), None);
    }
}
