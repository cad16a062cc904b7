// Domain layer - Map geometry and the world model
pub mod domain;

// Application layer - Viewport registry, camera navigation and view coordination
pub mod application;

// Infrastructure layer - UI, rendering, input
pub mod ui;
pub mod rendering;
pub mod input;

// Re-exports for convenience
pub use domain::{CellPos, CellRect, EntityId, World, WorldBounds, WorldProvider, expand_to_sections};
pub use application::{Camera, CameraNavigator, MultiViewController, Session, Settings, ViewportRegistry};
pub use ui::Button;
