use macroquad::prelude::*;

use crate::application::{Camera, MultiViewController, OutputSize, RenderBackend, RenderPass, Session, WorldRenderer};
use crate::domain::{CellRect, EntityId, Terrain, World, WorldProvider};
use crate::ui::{Button, ViewPanel, panel_x, grid_area_width, grid_area_height, CELL_SIZE, PANEL_WIDTH, TITLE_BAR_HEIGHT};

const BACKGROUND: Color = Color::new(0.06, 0.06, 0.06, 1.0);
const ENTITY_COLOR: Color = Color::new(1.0, 0.85, 0.3, 1.0);
const SELECTED_COLOR: Color = Color::new(1.0, 0.3, 0.3, 1.0);
const VIEWPORT_OUTLINE: Color = Color::new(0.0, 1.0, 0.6, 0.8);

fn terrain_color(terrain: Terrain) -> Color {
    match terrain {
        Terrain::Soil => Color::from_rgba(110, 80, 50, 255),
        Terrain::Grass => Color::from_rgba(60, 130, 60, 255),
        Terrain::Rock => Color::from_rgba(120, 120, 125, 255),
        Terrain::Water => Color::from_rgba(40, 80, 160, 255),
    }
}

/// Secondary view renderer backed by macroquad render targets
pub struct MacroquadBackend {
    /// Background the primary view clears to; copied onto every new target
    pub clear_color: Color,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self { clear_color: BACKGROUND }
    }
}

impl MacroquadBackend {
    fn camera_for(target: &RenderTarget, pass: &RenderPass) -> Camera2D {
        Camera2D {
            target: vec2(pass.position.x, pass.position.z),
            zoom: vec2(1.0 / pass.half_extent.x, 1.0 / pass.half_extent.y),
            render_target: Some(target.clone()),
            ..Default::default()
        }
    }
}

impl RenderBackend for MacroquadBackend {
    type Target = RenderTarget;

    fn allocate(&mut self, size: OutputSize) -> Option<RenderTarget> {
        let target = render_target(size.width, size.height);
        target.texture.set_filter(FilterMode::Nearest);
        Some(target)
    }

    fn release(&mut self, target: RenderTarget) {
        drop(target);
    }

    fn sync_appearance(&mut self, target: &mut RenderTarget) {
        set_camera(&Camera2D {
            render_target: Some(target.clone()),
            ..Default::default()
        });
        clear_background(self.clear_color);
        set_default_camera();
    }
}

impl WorldRenderer<World> for MacroquadBackend {
    fn render(&mut self, target: &mut RenderTarget, world: &World, pass: &RenderPass) {
        set_camera(&Self::camera_for(target, pass));
        clear_background(self.clear_color);

        for cell in pass.view_rect.cells() {
            if let Some(terrain) = world.terrain_at(cell) {
                draw_rectangle(cell.x as f32, cell.z as f32, 1.0, 1.0, terrain_color(terrain));
            }
        }
        for entity in world.entities().iter().filter(|e| pass.view_rect.contains(e.cell())) {
            draw_circle(entity.x, entity.z, 0.4, ENTITY_COLOR);
        }

        set_default_camera();
    }
}

/// Draw the primary view. Only cells inside `cull` are drawn.
pub fn draw_world(world: &World, camera: &Camera, cull: CellRect, selected: Option<EntityId>) {
    let cell_size = CELL_SIZE * camera.zoom;
    let area_width = grid_area_width();
    let area_height = grid_area_height();

    let Some(bounds) = world.bounds() else {
        return;
    };
    let visible = bounds
        .clip(camera.visible_rect(area_width, area_height, CELL_SIZE))
        .intersection(&cull);

    for cell in visible.cells() {
        if let Some(terrain) = world.terrain_at(cell) {
            let (sx, sy) = camera.world_to_screen(cell.x as f32, cell.z as f32, CELL_SIZE);
            draw_rectangle(sx, sy, cell_size, cell_size, terrain_color(terrain));
        }
    }

    for entity in world.entities().iter().filter(|e| visible.contains(e.cell())) {
        let (sx, sy) = camera.world_to_screen(entity.x, entity.z, CELL_SIZE);
        let radius = (cell_size * 0.4).max(1.5);
        draw_circle(sx, sy, radius, ENTITY_COLOR);
        if Some(entity.id) == selected {
            draw_circle_lines(sx, sy, radius + 3.0, 2.0, SELECTED_COLOR);
        }
    }
}

/// Outline each region covered by a secondary view
pub fn draw_viewport_outlines(rects: impl Iterator<Item = CellRect>, camera: &Camera) {
    let scale = CELL_SIZE * camera.zoom;
    for rect in rects {
        let (sx, sy) = camera.world_to_screen(rect.x as f32, rect.z as f32, CELL_SIZE);
        draw_rectangle_lines(sx, sy, rect.width as f32 * scale, rect.height as f32 * scale, 2.0, VIEWPORT_OUTLINE);
    }
}

/// Draw every secondary view into its panel; the newest one is highlighted
pub fn draw_view_panels(views: &MultiViewController<RenderTarget>, panels: &[ViewPanel], mouse_pos: (f32, f32)) {
    let last = views.len().saturating_sub(1);
    for (i, (view, panel)) in views.views().iter().zip(panels).enumerate() {
        let frame = panel.frame;
        draw_rectangle(frame.x, frame.y, frame.w, frame.h, BACKGROUND);

        if let Some(target) = view.navigator().render_target() {
            let content = panel.content;
            draw_texture_ex(
                &target.texture,
                content.x,
                content.y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(content.w, content.h)),
                    ..Default::default()
                },
            );
        }

        let bar = panel.title_bar;
        draw_rectangle(bar.x, bar.y, bar.w, bar.h, Color::from_rgba(30, 30, 30, 255));
        draw_text(&view.title(), bar.x + 4.0, bar.y + TITLE_BAR_HEIGHT - 5.0, 16.0, WHITE);

        let close = panel.close_button;
        let hovered = close.contains(vec2(mouse_pos.0, mouse_pos.1));
        draw_text("x", close.x + 6.0, close.y + TITLE_BAR_HEIGHT - 5.0, 18.0, if hovered { SELECTED_COLOR } else { GRAY });

        let border = if i == last { VIEWPORT_OUTLINE } else { GRAY };
        draw_rectangle_lines(frame.x, frame.y, frame.w, frame.h, 2.0, border);
    }
}

/// Draw control panel background
fn draw_panel_background() {
    draw_rectangle(panel_x(), 0.0, PANEL_WIDTH, screen_height(), Color::from_rgba(30, 30, 30, 255));
}

/// Helper to draw text labels
fn draw_text_label(text: &str, x: f32, y: f32, size: f32, color: Color) {
    draw_text(text, x, y, size, color);
}

/// Draw the control panel with buttons, help and registry info
pub fn draw_controls(session: &Session<RenderTarget>, camera: &Camera, buttons: &[Button], mouse_pos: (f32, f32)) {
    draw_panel_background();
    buttons.iter().for_each(|btn| btn.draw(mouse_pos));

    let px = panel_x();

    let controls = [
        ("Controls:", px, 280.0, 14.0, WHITE),
        ("LMB: Select", px, 295.0, 12.0, GRAY),
        ("Mid-drag: Pan", px, 308.0, 12.0, GRAY),
        ("Wheel: Zoom", px, 321.0, 12.0, GRAY),
        ("O: Open/close view", px, 334.0, 12.0, GRAY),
        ("X: Close top view", px, 347.0, 12.0, GRAY),
        ("F: Follow selected", px, 360.0, 12.0, GRAY),
        ("Z: Reset view zoom", px, 373.0, 12.0, GRAY),
        ("K: Kill selected", px, 386.0, 12.0, GRAY),
        ("H: Home", px, 399.0, 12.0, GRAY),
    ];
    controls.iter().for_each(|(text, x, y, size, color)| {
        draw_text_label(text, *x, *y, *size, *color);
    });

    let info = Color::from_rgba(150, 150, 150, 255);
    let registry = session.registry();
    let stats = registry.stats();
    draw_text_label(&registry.to_string(), px, 430.0, 12.0, info);
    draw_text_label(&format!("Recomputed: {}", stats.recomputations), px, 445.0, 12.0, info);
    draw_text_label(&format!("Sweeps: {}", stats.sweeps), px, 460.0, 12.0, info);
    draw_text_label(&format!("Frame: {}", registry.frame()), px, 475.0, 12.0, info);

    if let Some(world) = session.world() {
        let (w, h) = world.dimensions();
        draw_text_label(&format!("Map: {w}x{h}"), px, 500.0, 12.0, info);
        draw_text_label(&format!("Entities: {}", world.entities().len()), px, 515.0, 12.0, info);
    }

    let selected = session.selected.map_or_else(|| "none".to_owned(), |id| format!("#{}", id.0));
    let labels = [
        ("Selected:", px, 550.0, 16.0, WHITE),
        (selected.as_str(), px, 570.0, 14.0, Color::from_rgba(180, 180, 180, 255)),
        ("Status:", px, 600.0, 16.0, WHITE),
        (
            if session.is_paused { "Paused" } else { "Running" },
            px,
            620.0,
            16.0,
            if session.is_paused {
                Color::from_rgba(255, 165, 0, 255)
            } else {
                Color::from_rgba(0, 255, 0, 255)
            },
        ),
        ("Zoom:", px, 650.0, 14.0, WHITE),
        (&format!("{:.1}x", camera.zoom), px, 665.0, 14.0, Color::from_rgba(180, 180, 180, 255)),
        (&format!("FPS: {}", get_fps()), px, 690.0, 12.0, GRAY),
    ];
    labels.iter().for_each(|(text, x, y, size, color)| {
        draw_text_label(text, *x, *y, *size, *color);
    });
}
