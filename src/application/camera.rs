use crate::domain::{CellPos, CellRect};

const MIN_ZOOM: f32 = 0.25;
const MAX_ZOOM: f32 = 8.0;

/// Camera for the primary view: screen-space pan and zoom over the map
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub offset_x: f32,
    pub offset_y: f32,
    pub zoom: f32, // 1.0 = one cell is `cell_size` pixels
}

impl Camera {
    pub fn new() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
        }
    }

    /// Zoom in by factor, keeping the map point under `anchor` in place
    pub fn zoom_in(&mut self, factor: f32, anchor: (f32, f32)) {
        self.zoom_around(self.zoom * factor, anchor);
    }

    /// Zoom out by factor, keeping the map point under `anchor` in place
    pub fn zoom_out(&mut self, factor: f32, anchor: (f32, f32)) {
        self.zoom_around(self.zoom / factor, anchor);
    }

    fn zoom_around(&mut self, zoom: f32, anchor: (f32, f32)) {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let ratio = zoom / self.zoom;
        self.offset_x = anchor.0 - (anchor.0 - self.offset_x) * ratio;
        self.offset_y = anchor.1 - (anchor.1 - self.offset_y) * ratio;
        self.zoom = zoom;
    }

    /// Pan camera
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Convert screen coordinates to continuous map coordinates `(x, z)`
    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32, cell_size: f32) -> (f32, f32) {
        let scale = cell_size * self.zoom;
        ((screen_x - self.offset_x) / scale, (screen_y - self.offset_y) / scale)
    }

    /// Convert screen coordinates to the cell under them
    pub fn screen_to_grid(&self, screen_x: f32, screen_y: f32, cell_size: f32) -> CellPos {
        let (x, z) = self.screen_to_world(screen_x, screen_y, cell_size);
        CellPos::from_world(x, z)
    }

    /// Convert map coordinates to screen coordinates
    pub fn world_to_screen(&self, x: f32, z: f32, cell_size: f32) -> (f32, f32) {
        let scale = cell_size * self.zoom;
        (x * scale + self.offset_x, z * scale + self.offset_y)
    }

    /// Cells touched by a viewport of the given pixel size. Not clipped to the map.
    pub fn visible_rect(&self, viewport_width: f32, viewport_height: f32, cell_size: f32) -> CellRect {
        let min = self.screen_to_grid(0.0, 0.0, cell_size);
        let (max_x, max_z) = self.screen_to_world(viewport_width, viewport_height, cell_size);
        CellRect::from_corners(min.x, min.z, max_x.ceil() as i32 - 1, max_z.ceil() as i32 - 1)
    }

    /// Center the map cell `(x, z)` in a viewport of the given pixel size
    pub fn center_on(&mut self, x: f32, z: f32, viewport: (f32, f32), cell_size: f32) {
        let scale = cell_size * self.zoom;
        self.offset_x = viewport.0 / 2.0 - x * scale;
        self.offset_y = viewport.1 / 2.0 - z * scale;
    }

    /// Reset camera to default
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_world_round_trip_with_offset() {
        let mut camera = Camera::new();
        camera.pan(30.0, -20.0);
        camera.zoom_in(2.0, (0.0, 0.0));
        let (sx, sy) = camera.world_to_screen(12.5, 7.0, 10.0);
        let (x, z) = camera.screen_to_world(sx, sy, 10.0);
        assert!((x - 12.5).abs() < 1e-4 && (z - 7.0).abs() < 1e-4);
        assert_eq!(camera.screen_to_grid(sx, sy, 10.0), CellPos::new(12, 7));
    }

    #[test]
    fn test_visible_rect() {
        let camera = Camera::new();
        assert_eq!(camera.visible_rect(100.0, 50.0, 10.0), CellRect::new(0, 0, 10, 5));

        let mut camera = Camera::new();
        camera.pan(-25.0, 0.0);
        assert_eq!(camera.visible_rect(100.0, 50.0, 10.0), CellRect::from_corners(2, 0, 12, 4));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut camera = Camera::new();
        let anchor = (300.0, 200.0);
        let before = camera.screen_to_world(anchor.0, anchor.1, 10.0);
        camera.zoom_in(1.5, anchor);
        let after = camera.screen_to_world(anchor.0, anchor.1, 10.0);
        assert!((before.0 - after.0).abs() < 1e-3 && (before.1 - after.1).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::new();
        for _ in 0..100 {
            camera.zoom_in(2.0, (0.0, 0.0));
        }
        assert_eq!(camera.zoom, MAX_ZOOM);
        for _ in 0..100 {
            camera.zoom_out(2.0, (0.0, 0.0));
        }
        assert_eq!(camera.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_center_on() {
        let mut camera = Camera::new();
        camera.center_on(50.0, 40.0, (800.0, 600.0), 10.0);
        let (x, z) = camera.screen_to_world(400.0, 300.0, 10.0);
        assert!((x - 50.0).abs() < 1e-4 && (z - 40.0).abs() < 1e-4);
    }
}
