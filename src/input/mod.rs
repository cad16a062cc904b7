use macroquad::prelude::*;

use crate::application::{Camera, FollowToggle, RenderBackend, Session};
use crate::ui::{Button, ViewPanel, panel_at, grid_area_width, CELL_SIZE};

/// Cells around the cursor searched when picking an entity
const PICK_RADIUS: f32 = 2.0;
const PRIMARY_ZOOM_STEP: f32 = 1.1;

/// What the pointer is acting on
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointerTarget {
    Primary,
    /// Secondary view by stack index
    View(usize),
    /// The side panel
    Controls,
}

/// Resolve the pointer target; secondary views sit on top of the primary view
pub fn pointer_target(mouse_pos: (f32, f32), panels: &[ViewPanel]) -> PointerTarget {
    if mouse_pos.0 >= grid_area_width() {
        return PointerTarget::Controls;
    }
    panel_at(panels, mouse_pos).map_or(PointerTarget::Primary, PointerTarget::View)
}

/// Turns successive pointer positions into drag deltas.
/// A drag stays bound to the target it started on.
#[derive(Clone, Copy, Debug, Default)]
pub struct DragTracker {
    last: Option<(f32, f32)>,
    target: Option<PointerTarget>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame. Returns the delta since the previous frame while the button stays down.
    pub fn update(&mut self, down: bool, pos: (f32, f32), hovered: PointerTarget) -> Option<(PointerTarget, Vec2)> {
        if !down {
            self.last = None;
            self.target = None;
            return None;
        }
        let target = *self.target.get_or_insert(hovered);
        let delta = self.last.map(|last| vec2(pos.0 - last.0, pos.1 - last.1));
        self.last = Some(pos);
        delta.map(|d| (target, d))
    }

    pub fn is_dragging(&self) -> bool {
        self.target.is_some()
    }
}

/// Route mouse wheel to the hovered view or the primary camera
pub fn handle_zoom<T>(session: &mut Session<T>, camera: &mut Camera, hovered: PointerTarget, mouse_pos: (f32, f32)) {
    let wheel = mouse_wheel().1;
    if wheel == 0.0 {
        return;
    }
    match hovered {
        // Wheel up zooms in: a smaller view size
        PointerTarget::View(index) => {
            if let Some(view) = session.views_mut().view_mut(index) {
                view.navigator_mut().zoom(-wheel.signum());
            }
        }
        PointerTarget::Primary if wheel > 0.0 => camera.zoom_in(PRIMARY_ZOOM_STEP, mouse_pos),
        PointerTarget::Primary => camera.zoom_out(PRIMARY_ZOOM_STEP, mouse_pos),
        PointerTarget::Controls => {}
    }
}

/// Handle pan with middle mouse button drag
pub fn handle_pan<T>(
    session: &mut Session<T>,
    camera: &mut Camera,
    drag: &mut DragTracker,
    hovered: PointerTarget,
    mouse_pos: (f32, f32),
) {
    let Some((target, delta)) = drag.update(is_mouse_button_down(MouseButton::Middle), mouse_pos, hovered) else {
        return;
    };
    match target {
        PointerTarget::View(index) => {
            if let Some(view) = session.views_mut().view_mut(index) {
                view.navigator_mut().pan(delta);
            }
        }
        PointerTarget::Primary => camera.pan(delta.x, delta.y),
        PointerTarget::Controls => {}
    }
}

/// Left click on the primary view selects the nearest entity, or clears the selection
pub fn handle_selection<T>(session: &mut Session<T>, camera: &Camera, hovered: PointerTarget, mouse_pos: (f32, f32)) {
    if hovered != PointerTarget::Primary || !is_mouse_button_pressed(MouseButton::Left) {
        return;
    }
    let (x, z) = camera.screen_to_world(mouse_pos.0, mouse_pos.1, CELL_SIZE);
    session.selected = session.world().and_then(|w| w.nearest_entity(x, z, PICK_RADIUS));
}

/// Close buttons on view title bars. Returns true when a view closed;
/// `panels` then no longer matches the open views and must be laid out again.
pub fn handle_view_close<T, B>(
    session: &mut Session<T>,
    backend: &mut B,
    panels: &[ViewPanel],
    mouse_pos: (f32, f32),
) -> bool
where
    B: RenderBackend<Target = T>,
{
    is_mouse_button_pressed(MouseButton::Left) && close_clicked_view(session, backend, panels, mouse_pos)
}

/// Close the view whose close button is under `pos`, topmost first
pub fn close_clicked_view<T, B>(session: &mut Session<T>, backend: &mut B, panels: &[ViewPanel], pos: (f32, f32)) -> bool
where
    B: RenderBackend<Target = T>,
{
    let point = vec2(pos.0, pos.1);
    panels
        .iter()
        .rposition(|p| p.close_button.contains(point))
        .is_some_and(|index| session.close_view_at(index, backend))
}

fn toggle_follow<T>(session: &mut Session<T>) {
    match session.toggle_follow_top() {
        FollowToggle::NoSelection => log::info!("select an entity to follow"),
        FollowToggle::NoView => log::info!("open a view first"),
        FollowToggle::Following(_) | FollowToggle::Stopped => {}
    }
}

/// Process keyboard shortcuts
pub fn process_keyboard_input<T, B>(session: &mut Session<T>, camera: &mut Camera, backend: &mut B)
where
    B: RenderBackend<Target = T>,
{
    if is_key_pressed(KeyCode::O) {
        session.toggle_view(backend);
    }
    if is_key_pressed(KeyCode::X) {
        session.close_top_view(backend);
    }
    if is_key_pressed(KeyCode::F) {
        toggle_follow(session);
    }
    if is_key_pressed(KeyCode::Z) {
        session.views_mut().reset_zoom_top();
    }
    if is_key_pressed(KeyCode::K) {
        session.kill_selected();
    }
    if is_key_pressed(KeyCode::Space) {
        session.is_paused = !session.is_paused;
    }
    // Reset camera with 'H' (home)
    if is_key_pressed(KeyCode::H) {
        camera.reset();
    }
}

/// Process button clicks
pub fn process_button_clicks<T, B>(session: &mut Session<T>, buttons: &[Button], backend: &mut B, mouse_pos: (f32, f32))
where
    B: RenderBackend<Target = T>,
{
    for (idx, btn) in buttons.iter().enumerate() {
        if !btn.is_clicked(mouse_pos) {
            continue;
        }
        match idx {
            0 => {
                session.open_view();
            }
            1 => {
                session.close_top_view(backend);
            }
            2 => toggle_follow(session),
            3 => {
                session.views_mut().reset_zoom_top();
            }
            4 => session.is_paused = !session.is_paused,
            _ => {}
        }
    }
}
