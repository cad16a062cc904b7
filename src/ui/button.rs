use macroquad::prelude::*;

/// Button UI component with hover, click detection and a disabled state
#[derive(Clone)]
pub struct Button {
    rect: Rect,
    label: String,
    enabled: bool,
    color: Color,
    hover_color: Color,
}

impl Button {
    pub fn new(x: f32, y: f32, width: f32, height: f32, label: impl Into<String>) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            label: label.into(),
            enabled: true,
            color: Color::from_rgba(70, 130, 180, 255),
            hover_color: Color::from_rgba(100, 149, 237, 255),
        }
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Check if mouse is hovering over button
    pub fn is_hovered(&self, mouse_pos: (f32, f32)) -> bool {
        self.rect.contains(vec2(mouse_pos.0, mouse_pos.1))
    }

    /// Draw button with hover effect; disabled buttons are greyed out
    pub fn draw(&self, mouse_pos: (f32, f32)) {
        let (fill, text_color) = match (self.enabled, self.is_hovered(mouse_pos)) {
            (false, _) => (Color::from_rgba(60, 60, 60, 255), GRAY),
            (true, true) => (self.hover_color, WHITE),
            (true, false) => (self.color, WHITE),
        };
        let Rect { x, y, w, h } = self.rect;

        draw_rectangle(x, y, w, h, fill);
        draw_rectangle_lines(x, y, w, h, 2.0, text_color);

        let text_size = measure_text(&self.label, None, 20, 1.0);
        draw_text(
            &self.label,
            x + (w - text_size.width) / 2.0,
            y + (h + text_size.height) / 2.0,
            20.0,
            text_color,
        );
    }

    /// Check if an enabled button was clicked this frame
    pub fn is_clicked(&self, mouse_pos: (f32, f32)) -> bool {
        self.enabled && self.is_hovered(mouse_pos) && is_mouse_button_pressed(MouseButton::Left)
    }
}
