use log::info;

use super::controller::{FollowToggle, MultiViewController};
use super::render_target::{RenderBackend, WorldRenderer};
use super::settings::Settings;
use super::viewport_registry::ViewportRegistry;
use crate::domain::{CellRect, EntityId, World, WorldBounds};

/// Session orchestrates one loaded map and the views looking at it.
/// Owns the world, the shared viewport registry and the secondary views.
pub struct Session<T> {
    world: Option<World>,
    registry: ViewportRegistry,
    views: MultiViewController<T>,
    /// Entity picked in the primary view
    pub selected: Option<EntityId>,
    /// Pause entity movement
    pub is_paused: bool,
}

impl<T> Session<T> {
    /// Create a session with no map loaded
    pub fn new(settings: Settings) -> Self {
        Self {
            world: None,
            registry: ViewportRegistry::new(WorldBounds::new(0, 0)),
            views: MultiViewController::new(settings),
            selected: None,
            is_paused: false,
        }
    }

    /// Replace the map. Open views are re-centered on it on their next update.
    pub fn load_world<B>(&mut self, world: World, backend: &mut B)
    where
        B: RenderBackend<Target = T>,
    {
        if self.world.is_some() {
            self.unload_world(backend);
        }
        let (w, h) = world.dimensions();
        info!("loaded {w}x{h} map with {} entities", world.entities().len());
        self.registry = ViewportRegistry::new(WorldBounds::new(w as i32, h as i32));
        self.world = Some(world);
    }

    /// Close every view and drop the map
    pub fn unload_world<B>(&mut self, backend: &mut B)
    where
        B: RenderBackend<Target = T>,
    {
        self.views.close_all(&mut self.registry, backend);
        self.registry.clear();
        self.selected = None;
        if self.world.take().is_some() {
            info!("map unloaded");
        }
    }

    pub const fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn world_mut(&mut self) -> Option<&mut World> {
        self.world.as_mut()
    }

    pub const fn registry(&self) -> &ViewportRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ViewportRegistry {
        &mut self.registry
    }

    pub const fn views(&self) -> &MultiViewController<T> {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut MultiViewController<T> {
        &mut self.views
    }

    /// Start a new frame; the combined viewport is recomputed on first query
    pub fn begin_frame(&mut self) {
        self.registry.advance_frame();
    }

    /// Drop the selection once its entity is gone
    fn refresh_selection(&mut self) {
        let alive = match (&self.world, self.selected) {
            (Some(world), Some(id)) => world.entity(id).is_some(),
            _ => false,
        };
        if !alive {
            self.selected = None;
        }
    }

    /// Advance the world by `dt` seconds and tick every secondary view.
    /// View ticks land before any viewport query of this frame.
    pub fn update<B>(&mut self, dt: f32, backend: &mut B)
    where
        B: WorldRenderer<World, Target = T>,
    {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        if !self.is_paused {
            world.step(dt);
        }
        self.refresh_selection();
        if let Some(world) = &self.world {
            self.views.update(world, &mut self.registry, backend);
        }
    }

    pub fn open_view(&mut self) -> bool {
        self.views.open_view(&self.world, self.selected).is_some()
    }

    pub fn toggle_view<B>(&mut self, backend: &mut B) -> bool
    where
        B: RenderBackend<Target = T>,
    {
        self.views.toggle_open(&self.world, &mut self.registry, backend, self.selected)
    }

    pub fn close_top_view<B>(&mut self, backend: &mut B) -> bool
    where
        B: RenderBackend<Target = T>,
    {
        self.views.close_top(&mut self.registry, backend)
    }

    pub fn close_view_at<B>(&mut self, index: usize, backend: &mut B) -> bool
    where
        B: RenderBackend<Target = T>,
    {
        self.views.close_at(index, &mut self.registry, backend)
    }

    /// Follow the selected entity on the top view, or stop following
    pub fn toggle_follow_top(&mut self) -> FollowToggle {
        self.views.toggle_follow_top(self.selected, &self.world)
    }

    /// Remove the selected entity from the map
    pub fn kill_selected(&mut self) -> bool {
        let (Some(world), Some(id)) = (self.world.as_mut(), self.selected.take()) else {
            return false;
        };
        world.remove_entity(id)
    }

    /// Region the primary renderer should draw and cull against this frame
    pub fn effective_view_rect(&mut self, primary: CellRect) -> CellRect {
        if self.world.is_none() {
            return primary;
        }
        self.registry.effective_view_rect(primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render_target::testing::RecordingBackend;
    use crate::domain::WorldProvider;

    fn loaded_session(backend: &mut RecordingBackend) -> Session<u32> {
        let mut session = Session::new(Settings::default());
        session.load_world(World::new(200, 200), backend);
        session.is_paused = true;
        session
    }

    #[test]
    fn test_new_session_has_no_map() {
        let mut session: Session<u32> = Session::new(Settings::default());
        assert!(session.world().is_none());
        assert!(!session.open_view());
        let primary = CellRect::new(0, 0, 10, 10);
        assert_eq!(session.effective_view_rect(primary), primary);
    }

    #[test]
    fn test_effective_rect_widens_with_open_view() {
        let mut backend = RecordingBackend::default();
        let mut session = loaded_session(&mut backend);
        let primary = CellRect::new(0, 0, 10, 10);
        assert_eq!(session.effective_view_rect(primary), primary);

        assert!(session.open_view());
        session.begin_frame();
        session.update(0.016, &mut backend);
        let effective = session.effective_view_rect(primary);
        assert!(effective.contains_rect(&primary));
        assert!(effective.area() > primary.area());
    }

    #[test]
    fn test_unload_closes_views_and_clears_registry() {
        let mut backend = RecordingBackend::default();
        let mut session = loaded_session(&mut backend);
        session.open_view();
        session.open_view();
        session.update(0.016, &mut backend);
        assert_eq!(session.registry().len(), 2);

        session.unload_world(&mut backend);
        assert!(session.world().is_none());
        assert!(session.views().is_empty());
        assert!(session.registry().is_empty());
        assert_eq!(backend.released.len(), 2);
    }

    #[test]
    fn test_reload_gives_fresh_registry() {
        let mut backend = RecordingBackend::default();
        let mut session = loaded_session(&mut backend);
        session.open_view();
        session.update(0.016, &mut backend);

        session.load_world(World::new(50, 80), &mut backend);
        assert!(session.views().is_empty());
        assert_eq!(session.registry().bounds(), WorldBounds::new(50, 80));
        assert_eq!(session.registry().frame(), 0);
    }

    #[test]
    fn test_kill_selected_cancels_follow() {
        let mut backend = RecordingBackend::default();
        let mut session = loaded_session(&mut backend);
        let pawn = session.world_mut().unwrap().spawn_entity(60.0, 60.0);
        session.selected = Some(pawn);
        assert!(session.open_view());
        session.update(0.016, &mut backend);
        assert!(session.views().top().unwrap().navigator().is_following());

        assert!(session.kill_selected());
        assert!(session.selected.is_none());
        assert!(session.world().unwrap().locate(pawn).is_none());
        session.update(0.016, &mut backend);
        assert!(!session.views().top().unwrap().navigator().is_following());
        assert!(!session.kill_selected());
    }

    #[test]
    fn test_follow_and_close_through_session() {
        let mut backend = RecordingBackend::default();
        let mut session = loaded_session(&mut backend);
        assert_eq!(session.toggle_follow_top(), FollowToggle::NoView);
        session.open_view();
        assert_eq!(session.toggle_follow_top(), FollowToggle::NoSelection);

        let pawn = session.world_mut().unwrap().spawn_entity(30.0, 30.0);
        session.selected = Some(pawn);
        assert_eq!(session.toggle_follow_top(), FollowToggle::Following(pawn));

        session.open_view();
        session.update(0.016, &mut backend);
        assert!(session.close_view_at(0, &mut backend));
        assert!(!session.close_view_at(3, &mut backend));
        assert!(session.close_top_view(&mut backend));
        assert!(!session.close_top_view(&mut backend));
        assert!(!session.registry().has_active());
    }

    #[test]
    fn test_toggle_view() {
        let mut backend = RecordingBackend::default();
        let mut session = loaded_session(&mut backend);
        assert!(session.toggle_view(&mut backend));
        assert!(!session.toggle_view(&mut backend));
        assert!(session.views().is_empty());
    }
}
