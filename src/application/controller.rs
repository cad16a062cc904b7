//! Stack of open secondary views.
//!
//! The most recently opened view is the top of the stack and receives the
//! keyboard commands. Every view owns its own navigator; all of them share
//! the session's viewport registry.

use log::info;

use super::navigator::{CameraNavigator, DEFAULT_OUTPUT_SIZE};
use super::render_target::{OutputSize, RenderBackend, RenderPass, WorldRenderer};
use super::settings::Settings;
use super::viewport_registry::ViewportRegistry;
use crate::domain::{EntityId, WorldProvider};

/// Result of toggling follow mode on the top view
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FollowToggle {
    Following(EntityId),
    Stopped,
    /// Nothing selected to follow
    NoSelection,
    /// No secondary view is open
    NoView,
}

/// One open secondary view
pub struct SecondaryView<T> {
    number: u32,
    navigator: CameraNavigator<T>,
    output_size: OutputSize,
    last_pass: Option<RenderPass>,
}

impl<T> SecondaryView<T> {
    /// 1-based, in opening order; never reused
    pub const fn number(&self) -> u32 {
        self.number
    }

    pub const fn navigator(&self) -> &CameraNavigator<T> {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut CameraNavigator<T> {
        &mut self.navigator
    }

    pub const fn output_size(&self) -> OutputSize {
        self.output_size
    }

    /// Size the view is drawn at; applied on the next update
    pub fn set_output_size(&mut self, size: OutputSize) {
        self.output_size = size;
    }

    /// Pass issued on the most recent tick that rendered
    pub const fn last_pass(&self) -> Option<&RenderPass> {
        self.last_pass.as_ref()
    }

    pub fn title(&self) -> String {
        let nav = &self.navigator;
        match nav.follow_target() {
            Some(id) => format!("View {} - following #{} - {:.0}%", self.number, id.0, nav.zoom_percent()),
            None => format!("View {} - {:.0}%", self.number, nav.zoom_percent()),
        }
    }
}

pub struct MultiViewController<T> {
    settings: Settings,
    views: Vec<SecondaryView<T>>,
    next_number: u32,
    /// Zoom of the last closed view, reapplied to new views
    saved_zoom: Option<f32>,
}

impl<T> MultiViewController<T> {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            views: Vec::new(),
            next_number: 1,
            saved_zoom: None,
        }
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Views from oldest to newest
    pub fn views(&self) -> &[SecondaryView<T>] {
        &self.views
    }

    pub fn view_mut(&mut self, index: usize) -> Option<&mut SecondaryView<T>> {
        self.views.get_mut(index)
    }

    pub fn top(&self) -> Option<&SecondaryView<T>> {
        self.views.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut SecondaryView<T>> {
        self.views.last_mut()
    }

    /// Zoom a newly opened view starts at, when `rememberZoomLevel` is on
    pub fn saved_zoom(&self) -> Option<f32> {
        self.saved_zoom.filter(|_| self.settings.remember_zoom_level)
    }

    /// Open a view centered on the map.
    ///
    /// With `autoFollowSelected` on, the new view follows `selected`.
    /// With `rememberZoomLevel` on, it starts at the zoom of the last closed view.
    /// Refused while no map is loaded or when `maxViews` are already open.
    pub fn open_view(
        &mut self,
        world: &impl WorldProvider,
        selected: Option<EntityId>,
    ) -> Option<&mut SecondaryView<T>> {
        if self.views.len() >= self.settings.max_views {
            info!("not opening another view, {} already open", self.views.len());
            return None;
        }
        let mut navigator = CameraNavigator::new(self.settings.clone());
        navigator.initialize(world);
        if !navigator.is_ready() {
            info!("not opening a view without a map");
            return None;
        }
        if let Some(zoom) = self.saved_zoom() {
            navigator.zoom_to(zoom);
        }
        if self.settings.auto_follow_selected && selected.is_some() {
            navigator.set_follow_target(selected, world);
        }

        let number = self.next_number;
        self.next_number += 1;
        info!("opened secondary view {number}");
        self.views.push(SecondaryView {
            number,
            navigator,
            output_size: DEFAULT_OUTPUT_SIZE,
            last_pass: None,
        });
        self.views.last_mut()
    }

    /// Open a view that follows `entity` regardless of `autoFollowSelected`
    pub fn open_view_following(
        &mut self,
        entity: EntityId,
        world: &impl WorldProvider,
    ) -> Option<&mut SecondaryView<T>> {
        let view = self.open_view(world, None)?;
        view.navigator.set_follow_target(Some(entity), world);
        Some(view)
    }

    /// Close the top view when any is open, otherwise open one. Returns true if a view was opened.
    pub fn toggle_open<B>(
        &mut self,
        world: &impl WorldProvider,
        registry: &mut ViewportRegistry,
        backend: &mut B,
        selected: Option<EntityId>,
    ) -> bool
    where
        B: RenderBackend<Target = T>,
    {
        if self.close_top(registry, backend) {
            false
        } else {
            self.open_view(world, selected).is_some()
        }
    }

    /// Close the most recent view. Returns false when none is open.
    pub fn close_top<B>(&mut self, registry: &mut ViewportRegistry, backend: &mut B) -> bool
    where
        B: RenderBackend<Target = T>,
    {
        let Some(view) = self.views.pop() else {
            return false;
        };
        self.retire(view, registry, backend);
        true
    }

    /// Close the view at `index`, e.g. from its close button
    pub fn close_at<B>(&mut self, index: usize, registry: &mut ViewportRegistry, backend: &mut B) -> bool
    where
        B: RenderBackend<Target = T>,
    {
        if index >= self.views.len() {
            return false;
        }
        let view = self.views.remove(index);
        self.retire(view, registry, backend);
        true
    }

    pub fn close_all<B>(&mut self, registry: &mut ViewportRegistry, backend: &mut B)
    where
        B: RenderBackend<Target = T>,
    {
        while self.close_top(registry, backend) {}
    }

    /// Stop following on the top view, or start following `selected`
    pub fn toggle_follow_top(&mut self, selected: Option<EntityId>, world: &impl WorldProvider) -> FollowToggle {
        let Some(view) = self.views.last_mut() else {
            return FollowToggle::NoView;
        };
        let nav = &mut view.navigator;
        if nav.is_following() {
            nav.cancel_follow();
            return FollowToggle::Stopped;
        }
        let Some(entity) = selected else {
            return FollowToggle::NoSelection;
        };
        nav.set_follow_target(Some(entity), world);
        match nav.follow_target() {
            Some(id) => FollowToggle::Following(id),
            None => FollowToggle::NoSelection,
        }
    }

    /// Reset zoom on the top view. Returns false when none is open.
    pub fn reset_zoom_top(&mut self) -> bool {
        self.views.last_mut().map(|v| v.navigator.reset_zoom()).is_some()
    }

    /// Tick every view, oldest first. Run before the renderer queries the registry this frame.
    pub fn update<W, B>(&mut self, world: &W, registry: &mut ViewportRegistry, backend: &mut B)
    where
        W: WorldProvider,
        B: WorldRenderer<W, Target = T>,
    {
        for view in &mut self.views {
            if !view.navigator.is_ready() {
                view.navigator.initialize(world);
            }
            if let Some(pass) = view.navigator.tick(view.output_size, world, registry, backend) {
                view.last_pass = Some(pass);
            }
        }
    }

    fn retire<B>(&mut self, mut view: SecondaryView<T>, registry: &mut ViewportRegistry, backend: &mut B)
    where
        B: RenderBackend<Target = T>,
    {
        self.saved_zoom = self
            .settings
            .remember_zoom_level
            .then(|| view.navigator.zoom_size());
        view.navigator.teardown(registry, backend);
        info!("closed secondary view {}", view.number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render_target::testing::RecordingBackend;
    use crate::domain::World;

    struct Fixture {
        world: World,
        registry: ViewportRegistry,
        backend: RecordingBackend,
        views: MultiViewController<u32>,
    }

    fn fixture(settings: Settings) -> Fixture {
        let world = World::new(200, 200);
        let registry = ViewportRegistry::new(world.bounds().unwrap());
        Fixture {
            world,
            registry,
            backend: RecordingBackend::default(),
            views: MultiViewController::new(settings),
        }
    }

    impl Fixture {
        fn update(&mut self) {
            self.views.update(&self.world, &mut self.registry, &mut self.backend);
        }
    }

    #[test]
    fn test_open_registers_on_first_update() {
        let mut f = fixture(Settings::default());
        assert!(f.views.open_view(&f.world, None).is_some());
        assert!(!f.registry.has_active());

        f.update();
        assert_eq!(f.registry.len(), 1);
        assert!(f.views.top().unwrap().last_pass().is_some());
    }

    #[test]
    fn test_open_refused_without_map() {
        let mut views: MultiViewController<u32> = MultiViewController::new(Settings::default());
        let world: Option<World> = None;
        assert!(views.open_view(&world, None).is_none());
        assert!(views.is_empty());
    }

    #[test]
    fn test_max_views_limit() {
        let settings = Settings {
            max_views: 2,
            ..Settings::default()
        };
        let mut f = fixture(settings);
        assert!(f.views.open_view(&f.world, None).is_some());
        assert!(f.views.open_view(&f.world, None).is_some());
        assert!(f.views.open_view(&f.world, None).is_none());
        assert_eq!(f.views.len(), 2);
    }

    #[test]
    fn test_auto_follow_selected() {
        let mut f = fixture(Settings::default());
        let pawn = f.world.spawn_entity(40.0, 40.0);
        let view = f.views.open_view(&f.world, Some(pawn)).unwrap();
        assert_eq!(view.navigator().follow_target(), Some(pawn));

        let settings = Settings {
            auto_follow_selected: false,
            ..Settings::default()
        };
        let mut f = fixture(settings);
        let pawn = f.world.spawn_entity(40.0, 40.0);
        let view = f.views.open_view(&f.world, Some(pawn)).unwrap();
        assert!(!view.navigator().is_following());

        let view = f.views.open_view_following(pawn, &f.world).unwrap();
        assert_eq!(view.navigator().follow_target(), Some(pawn));
    }

    #[test]
    fn test_close_top_unregisters_only_its_view() {
        let mut f = fixture(Settings::default());
        let pawn = f.world.spawn_entity(20.0, 20.0);
        f.views.open_view(&f.world, None);
        f.views.open_view_following(pawn, &f.world);
        f.update();
        assert_eq!(f.registry.len(), 2);

        let kept = f.views.views()[0].navigator().viewport_id().unwrap();
        assert!(f.views.close_top(&mut f.registry, &mut f.backend));
        assert_eq!(f.registry.len(), 1);
        assert!(f.registry.get(kept).is_some());
        assert_eq!(f.backend.released.len(), 1);
    }

    #[test]
    fn test_close_at_and_close_all() {
        let mut f = fixture(Settings::default());
        for _ in 0..3 {
            f.views.open_view(&f.world, None);
        }
        f.update();
        assert!(f.views.close_at(0, &mut f.registry, &mut f.backend));
        assert!(!f.views.close_at(5, &mut f.registry, &mut f.backend));
        assert_eq!(f.views.views()[0].number(), 2);

        f.views.close_all(&mut f.registry, &mut f.backend);
        assert!(f.views.is_empty());
        assert!(!f.registry.has_active());
        assert_eq!(f.backend.released.len(), 3);
        assert!(!f.views.close_top(&mut f.registry, &mut f.backend));
    }

    #[test]
    fn test_toggle_open() {
        let mut f = fixture(Settings::default());
        assert!(f.views.toggle_open(&f.world, &mut f.registry, &mut f.backend, None));
        assert_eq!(f.views.len(), 1);
        assert!(!f.views.toggle_open(&f.world, &mut f.registry, &mut f.backend, None));
        assert!(f.views.is_empty());
    }

    #[test]
    fn test_toggle_follow_top() {
        let mut f = fixture(Settings {
            auto_follow_selected: false,
            ..Settings::default()
        });
        let pawn = f.world.spawn_entity(30.0, 30.0);
        assert_eq!(f.views.toggle_follow_top(Some(pawn), &f.world), FollowToggle::NoView);

        f.views.open_view(&f.world, None);
        assert_eq!(f.views.toggle_follow_top(None, &f.world), FollowToggle::NoSelection);
        assert_eq!(f.views.toggle_follow_top(Some(pawn), &f.world), FollowToggle::Following(pawn));
        assert_eq!(f.views.toggle_follow_top(Some(pawn), &f.world), FollowToggle::Stopped);

        f.world.remove_entity(pawn);
        assert_eq!(f.views.toggle_follow_top(Some(pawn), &f.world), FollowToggle::NoSelection);
    }

    #[test]
    fn test_reset_zoom_top() {
        let mut f = fixture(Settings::default());
        assert!(!f.views.reset_zoom_top());
        f.views.open_view(&f.world, None);
        f.views.top_mut().unwrap().navigator_mut().zoom_to(80.0);
        assert!(f.views.reset_zoom_top());
        assert_eq!(f.views.top().unwrap().navigator().zoom_size(), 12.0);
    }

    #[test]
    fn test_reopened_view_keeps_last_zoom() {
        let mut f = fixture(Settings::default());
        assert_eq!(f.views.saved_zoom(), None);
        f.views.open_view(&f.world, None);
        f.views.top_mut().unwrap().navigator_mut().zoom_to(40.0);
        f.views.close_top(&mut f.registry, &mut f.backend);
        assert_eq!(f.views.saved_zoom(), Some(40.0));

        let view = f.views.open_view(&f.world, None).unwrap();
        assert_eq!(view.navigator().zoom_size(), 40.0);

        // close_at records too, and reset_zoom still goes to the default
        f.views.top_mut().unwrap().navigator_mut().zoom_to(5.0);
        f.views.close_at(0, &mut f.registry, &mut f.backend);
        let view = f.views.open_view(&f.world, None).unwrap();
        assert_eq!(view.navigator().zoom_size(), 5.0);
        f.views.reset_zoom_top();
        assert_eq!(f.views.top().unwrap().navigator().zoom_size(), 12.0);
    }

    #[test]
    fn test_zoom_not_remembered_when_disabled() {
        let mut f = fixture(Settings {
            remember_zoom_level: false,
            ..Settings::default()
        });
        f.views.open_view(&f.world, None);
        f.views.top_mut().unwrap().navigator_mut().zoom_to(40.0);
        f.views.close_top(&mut f.registry, &mut f.backend);
        assert_eq!(f.views.saved_zoom(), None);

        let view = f.views.open_view(&f.world, None).unwrap();
        assert_eq!(view.navigator().zoom_size(), 12.0);
    }

    #[test]
    fn test_view_numbers_are_not_reused() {
        let mut f = fixture(Settings::default());
        f.views.open_view(&f.world, None);
        f.views.close_top(&mut f.registry, &mut f.backend);
        let view = f.views.open_view(&f.world, None).unwrap();
        assert_eq!(view.number(), 2);
        assert_eq!(view.title(), "View 2 - 10%");
    }

    #[test]
    fn test_output_size_reaches_backend() {
        let mut f = fixture(Settings::default());
        f.views.open_view(&f.world, None);
        let size = OutputSize::new(640, 480);
        f.views.top_mut().unwrap().set_output_size(size);
        f.update();
        assert_eq!(f.backend.allocated, vec![(1, size)]);
    }
}
