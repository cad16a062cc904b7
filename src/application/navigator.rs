//! Camera navigator for one secondary view.
//!
//! Owns the view's position and zoom, turns pan/zoom/follow input into a
//! clamped camera state, and every tick publishes the section-aligned view
//! rect to the viewport registry. Zoom is the half-extent of the view along
//! Z; the X half-extent is zoom times the aspect ratio.

use log::debug;
use macroquad::math::{Vec2, Vec3, vec2, vec3};

use super::render_target::{OutputSize, RenderBackend, RenderPass, WorldRenderer};
use super::settings::Settings;
use super::viewport_registry::{ViewportId, ViewportRegistry};
use crate::domain::{CellRect, EntityId, WorldBounds, WorldProvider, expand_to_sections};

/// Fixed camera height above the map
pub const CAMERA_ELEVATION: f32 = 15.0;

const BASE_PAN_SPEED: f32 = 0.015;
const MIN_PAN_SPEED_FACTOR: f32 = 0.3;
const MAX_PAN_SPEED_FACTOR: f32 = 3.0;
/// Below one, flattens the speed curve at both zoom extremes
const PAN_SPEED_EXPONENT: f32 = 0.7;

/// Fraction of the view extent kept between the camera center and the map edge
const EDGE_BUFFER_RATIO: f32 = 0.1;

/// Outputs this small keep their previous render target
const MIN_TARGET_DIMENSION: u32 = 100;

/// Target size used until the view reports a usable output size
pub const DEFAULT_OUTPUT_SIZE: OutputSize = OutputSize::new(800, 600);
/// View corners are kept inside +-2^29 cells
const CELL_COORD_LIMIT: f32 = 536_870_912.0;

/// Whether the camera moves on its own or tracks an entity
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CameraMode {
    #[default]
    Free,
    Following(EntityId),
}

/// Multiplicative zoom step for one wheel notch.
/// Small zoom sizes step finely, large ones coarsely.
fn zoom_step(zoom: f32, zoom_in: bool) -> f32 {
    match (zoom, zoom_in) {
        (z, true) if z < 10.0 => 0.95,
        (z, true) if z < 30.0 => 0.90,
        (z, true) if z < 60.0 => 0.85,
        (_, true) => 0.80,
        (z, false) if z < 10.0 => 1.05,
        (z, false) if z < 30.0 => 1.10,
        (z, false) if z < 60.0 => 1.15,
        (_, false) => 1.20,
    }
}

/// Clamp one axis of the camera center. Views wider than the map sit at its middle.
fn clamp_axis(value: f32, half_extent: f32, map_size: f32) -> f32 {
    let buffer = half_extent * 2.0 * EDGE_BUFFER_RATIO;
    let lo = half_extent + buffer;
    let hi = map_size - half_extent - buffer;
    if lo > hi { map_size / 2.0 } else { value.clamp(lo, hi) }
}

fn to_cell(v: f32) -> i32 {
    v.clamp(-CELL_COORD_LIMIT, CELL_COORD_LIMIT) as i32
}

pub struct CameraNavigator<T> {
    settings: Settings,
    position: Vec3,
    zoom: f32,
    mode: CameraMode,
    ready: bool,
    bounds: Option<WorldBounds>,
    last_output: Option<OutputSize>,
    target: Option<T>,
    target_size: Option<OutputSize>,
    viewport_id: Option<ViewportId>,
    view_rect: CellRect,
    ticks_since_render: u32,
}

impl<T> CameraNavigator<T> {
    /// Create an uninitialized navigator. Nothing is registered until `tick`.
    pub fn new(settings: Settings) -> Self {
        let settings = settings.normalized();
        let zoom = settings.default_zoom;
        Self {
            settings,
            position: vec3(0.0, CAMERA_ELEVATION, 0.0),
            zoom,
            mode: CameraMode::Free,
            ready: false,
            bounds: None,
            last_output: None,
            target: None,
            target_size: None,
            viewport_id: None,
            view_rect: CellRect::EMPTY,
            ticks_since_render: 0,
        }
    }

    /// Center on the map at the default zoom.
    /// Stays not-ready while no map is loaded; call again later.
    pub fn initialize(&mut self, world: &impl WorldProvider) {
        let Some(bounds) = world.bounds() else {
            debug!("navigator waiting for a map");
            return;
        };
        let (cx, cz) = bounds.center();
        self.bounds = Some(bounds);
        self.position = vec3(cx, CAMERA_ELEVATION, cz);
        self.zoom = self.settings.clamp_zoom(self.settings.default_zoom);
        self.ready = true;
        self.clamp_to_bounds();
    }

    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    pub const fn position(&self) -> Vec3 {
        self.position
    }

    pub const fn zoom_size(&self) -> f32 {
        self.zoom
    }

    pub const fn mode(&self) -> CameraMode {
        self.mode
    }

    pub const fn is_following(&self) -> bool {
        matches!(self.mode, CameraMode::Following(_))
    }

    pub const fn follow_target(&self) -> Option<EntityId> {
        match self.mode {
            CameraMode::Following(id) => Some(id),
            CameraMode::Free => None,
        }
    }

    pub const fn viewport_id(&self) -> Option<ViewportId> {
        self.viewport_id
    }

    /// Aligned rect published on the last tick
    pub const fn view_rect(&self) -> CellRect {
        self.view_rect
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub const fn render_target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// Zoom position across the configured range, 0 at min and 100 at max
    pub fn zoom_percent(&self) -> f32 {
        let span = self.settings.max_zoom - self.settings.min_zoom;
        if span <= f32::EPSILON {
            return 0.0;
        }
        ((self.zoom - self.settings.min_zoom) / span * 100.0).clamp(0.0, 100.0)
    }

    /// Visible half-extents on X and Z
    pub fn half_extents(&self) -> Vec2 {
        vec2(self.zoom * self.settings.aspect_ratio, self.zoom)
    }

    /// Pan speed in world units per input unit.
    ///
    /// Scales with zoom so a drag covers a similar share of the view at every
    /// zoom level; the normalized zoom is eased by `PAN_SPEED_EXPONENT` and the
    /// result held between the speeds at the two zoom limits.
    pub fn adaptive_pan_speed(&self) -> f32 {
        let (min_zoom, max_zoom) = (self.settings.min_zoom, self.settings.max_zoom);
        let span = max_zoom - min_zoom;
        let normalized = if span > f32::EPSILON {
            ((self.zoom - min_zoom) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let eased = normalized.powf(PAN_SPEED_EXPONENT);
        let factor = MIN_PAN_SPEED_FACTOR + eased * (MAX_PAN_SPEED_FACTOR - MIN_PAN_SPEED_FACTOR);

        let speed = BASE_PAN_SPEED * self.zoom * factor;
        let min_speed = BASE_PAN_SPEED * MIN_PAN_SPEED_FACTOR * min_zoom;
        let max_speed = BASE_PAN_SPEED * MAX_PAN_SPEED_FACTOR * max_zoom;
        speed.clamp(min_speed, max_speed)
    }

    /// Move the camera by a drag delta. Cancels follow mode.
    /// Dragging right moves the view left; dragging down moves it up the Z axis.
    pub fn pan(&mut self, delta: Vec2) {
        if !self.ready {
            return;
        }
        self.cancel_follow();
        let speed = self.adaptive_pan_speed();
        self.position.x -= delta.x * speed;
        self.position.z += delta.y * speed;
        self.clamp_to_bounds();
    }

    /// Zoom by one wheel step. Negative `delta` zooms in, positive zooms out.
    pub fn zoom(&mut self, delta: f32) {
        if !self.ready || delta == 0.0 || !delta.is_finite() {
            return;
        }
        let factor = zoom_step(self.zoom, delta < 0.0).powf(self.settings.zoom_speed_factor);
        self.zoom = self.settings.clamp_zoom(self.zoom * factor);
        self.clamp_to_bounds();
    }

    pub fn zoom_to(&mut self, target: f32) {
        if !target.is_finite() {
            return;
        }
        self.zoom = self.settings.clamp_zoom(target);
        self.clamp_to_bounds();
    }

    pub fn reset_zoom(&mut self) {
        self.zoom_to(self.settings.default_zoom);
    }

    /// Follow `entity`, or stop following with `None`.
    /// An entity that is not on the map is treated as already gone.
    pub fn set_follow_target(&mut self, entity: Option<EntityId>, world: &impl WorldProvider) {
        let Some(id) = entity else {
            self.cancel_follow();
            return;
        };
        match world.locate(id) {
            Some((x, z)) => {
                debug!("following entity {}", id.0);
                self.mode = CameraMode::Following(id);
                self.position = vec3(x, CAMERA_ELEVATION, z);
                self.zoom = self.settings.clamp_zoom(self.zoom);
                self.clamp_to_bounds();
            }
            None => {
                debug!("entity {} is not on the map, not following", id.0);
                self.cancel_follow();
            }
        }
    }

    pub fn cancel_follow(&mut self) {
        if let CameraMode::Following(id) = self.mode {
            debug!("stopped following entity {}", id.0);
        }
        self.mode = CameraMode::Free;
    }

    /// Pull the camera center back inside the map, keeping a small margin from the edges
    pub fn clamp_to_bounds(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let half = self.half_extents();
        self.position.x = clamp_axis(self.position.x, half.x, bounds.width as f32);
        self.position.z = clamp_axis(self.position.z, half.y, bounds.height as f32);
    }

    /// Cells under the camera before alignment, not clipped
    pub fn raw_view_rect(&self) -> CellRect {
        let half = self.half_extents();
        CellRect::from_corners(
            to_cell((self.position.x - half.x).floor()),
            to_cell((self.position.z - half.y).floor()),
            to_cell((self.position.x + half.x).ceil()).saturating_sub(1),
            to_cell((self.position.z + half.y).ceil()).saturating_sub(1),
        )
    }

    /// Advance one frame.
    ///
    /// Reallocates the render target when the output size changed, refreshes
    /// the follow position, publishes the aligned view rect, and every
    /// `render_interval_ticks` ticks renders into the target. Returns the
    /// pass when one was issued.
    pub fn tick<W, B>(
        &mut self,
        output: OutputSize,
        world: &W,
        registry: &mut ViewportRegistry,
        backend: &mut B,
    ) -> Option<RenderPass>
    where
        W: WorldProvider,
        B: WorldRenderer<W, Target = T>,
    {
        let Some(bounds) = world.bounds().filter(|_| self.ready) else {
            self.view_rect = CellRect::EMPTY;
            self.release_viewport(registry);
            return None;
        };
        self.bounds = Some(bounds);

        if self.last_output != Some(output) {
            self.last_output = Some(output);
            self.resize_target(output, backend);
        }

        if let CameraMode::Following(id) = self.mode {
            match world.locate(id) {
                Some((x, z)) => {
                    self.position.x = x;
                    self.position.z = z;
                }
                None => {
                    debug!("follow target {} left the map", id.0);
                    self.mode = CameraMode::Free;
                }
            }
        }
        self.clamp_to_bounds();

        self.view_rect = expand_to_sections(self.raw_view_rect(), world.section_size(), bounds);
        self.publish_viewport(registry);

        self.ticks_since_render += 1;
        if self.ticks_since_render < self.settings.render_interval_ticks {
            return None;
        }
        self.ticks_since_render = 0;

        let size = self.target_size?;
        let pass = RenderPass {
            position: self.position,
            half_extent: self.half_extents(),
            view_rect: bounds.clip(self.raw_view_rect()),
            size,
        };
        let target = self.target.as_mut()?;
        backend.render(target, world, &pass);
        Some(pass)
    }

    /// Unregister and release the target. The navigator must be initialized again before reuse.
    pub fn teardown<B>(&mut self, registry: &mut ViewportRegistry, backend: &mut B)
    where
        B: RenderBackend<Target = T>,
    {
        self.release_viewport(registry);
        if let Some(target) = self.target.take() {
            backend.release(target);
        }
        self.target_size = None;
        self.last_output = None;
        self.view_rect = CellRect::EMPTY;
        self.mode = CameraMode::Free;
        self.ready = false;
    }

    fn resize_target<B>(&mut self, output: OutputSize, backend: &mut B)
    where
        B: RenderBackend<Target = T>,
    {
        let usable = output.width > MIN_TARGET_DIMENSION && output.height > MIN_TARGET_DIMENSION;
        let size = match (self.target.is_some(), usable) {
            (true, false) => return,
            (true, true) if self.target_size == Some(output) => return,
            (_, true) => output,
            (false, false) => DEFAULT_OUTPUT_SIZE,
        };

        if let Some(old) = self.target.take() {
            backend.release(old);
        }
        self.target_size = None;
        match backend.allocate(size) {
            Some(mut target) => {
                backend.sync_appearance(&mut target);
                debug!("render target allocated at {}x{}", size.width, size.height);
                self.target = Some(target);
                self.target_size = Some(size);
            }
            None => {
                // Retried on the next size change
                debug!("render target allocation failed at {}x{}", size.width, size.height);
                self.last_output = None;
            }
        }
    }

    fn publish_viewport(&mut self, registry: &mut ViewportRegistry) {
        if self.view_rect.is_empty() {
            self.release_viewport(registry);
            return;
        }
        match self.viewport_id {
            // Another owner may have cleared the registry; register again
            Some(id) if registry.get(id).is_some() => registry.update(id, self.view_rect),
            _ => self.viewport_id = registry.register(self.view_rect),
        }
    }

    fn release_viewport(&mut self, registry: &mut ViewportRegistry) {
        if let Some(id) = self.viewport_id.take() {
            registry.unregister(id);
        }
    }
}
