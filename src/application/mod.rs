mod camera;
mod controller;
mod navigator;
mod render_target;
mod session;
mod settings;
mod viewport_registry;

pub use camera::Camera;
pub use controller::{FollowToggle, MultiViewController, SecondaryView};
pub use navigator::{CAMERA_ELEVATION, CameraMode, CameraNavigator, DEFAULT_OUTPUT_SIZE};
pub use render_target::{OutputSize, RenderBackend, RenderPass, WorldRenderer};
pub use session::Session;
pub use settings::{ASPECT_LIMIT, SETTINGS_ENV_VAR, Settings, SettingsError, ZOOM_LIMIT};
pub use viewport_registry::{RegistryStats, SWEEP_INTERVAL_FRAMES, ViewportId, ViewportRegistry};

#[cfg(test)]
pub(crate) use render_target::testing;
