//! Camera settings loaded from a JSON file.
//!
//! Every field is optional in the file; missing fields take the defaults
//! below. Values are normalized after loading so the navigator can rely on
//! `min_zoom <= default_zoom <= max_zoom` and a render interval of at least one.

use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the settings file read by the demo
pub const SETTINGS_ENV_VAR: &str = "MULTIVIEW_SETTINGS";

/// Largest accepted zoom size, in cells
pub const ZOOM_LIMIT: f32 = 10_000.0;
/// Widest accepted aspect ratio, either way round
pub const ASPECT_LIMIT: f32 = 16.0;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Smallest zoom size (closest view)
    pub min_zoom: f32,
    /// Largest zoom size (widest view)
    pub max_zoom: f32,
    /// Zoom size for new views and `reset_zoom`
    pub default_zoom: f32,
    /// Exponent applied to each zoom step
    pub zoom_speed_factor: f32,
    /// New views follow the selected entity
    pub auto_follow_selected: bool,
    /// Ticks between render passes
    pub render_interval_ticks: u32,
    /// Width over height of a secondary view
    pub aspect_ratio: f32,
    /// Upper limit on simultaneously open secondary views
    pub max_views: usize,
    /// A reopened view starts at the zoom the last closed view had
    pub remember_zoom_level: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 120.0,
            default_zoom: 12.0,
            zoom_speed_factor: 1.0,
            auto_follow_selected: true,
            render_interval_ticks: 1,
            aspect_ratio: 800.0 / 600.0,
            max_views: 4,
            remember_zoom_level: true,
        }
    }
}

impl Settings {
    /// Parse from a JSON string and normalize
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.normalized())
    }

    /// Read and parse a settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Settings from the file named by `MULTIVIEW_SETTINGS`, defaults when unset or unreadable
    pub fn from_env_or_default() -> Self {
        let Ok(path) = std::env::var(SETTINGS_ENV_VAR) else {
            return Self::default();
        };
        Self::load(&path).unwrap_or_else(|e| {
            warn!("{e}; using default settings");
            Self::default()
        })
    }

    /// Repair inconsistent values
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();

        if !(self.max_zoom.is_finite() && self.max_zoom > 0.0) {
            warn!("max zoom {} is not positive, using {}", self.max_zoom, defaults.max_zoom);
            self.max_zoom = defaults.max_zoom;
        }
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            warn!("min zoom {} is not positive, using {}", self.min_zoom, defaults.min_zoom);
            self.min_zoom = defaults.min_zoom;
        }
        if self.max_zoom > ZOOM_LIMIT {
            warn!("max zoom {} above {ZOOM_LIMIT}, capping", self.max_zoom);
            self.max_zoom = ZOOM_LIMIT;
        }
        if self.min_zoom > ZOOM_LIMIT {
            warn!("min zoom {} above {ZOOM_LIMIT}, capping", self.min_zoom);
            self.min_zoom = ZOOM_LIMIT;
        }
        if self.min_zoom > self.max_zoom {
            warn!("min zoom {} exceeds max zoom {}, swapping", self.min_zoom, self.max_zoom);
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }

        let clamped = if self.default_zoom.is_finite() {
            self.default_zoom.clamp(self.min_zoom, self.max_zoom)
        } else {
            defaults.default_zoom.clamp(self.min_zoom, self.max_zoom)
        };
        if clamped != self.default_zoom {
            warn!("default zoom {} outside [{}, {}], using {}", self.default_zoom, self.min_zoom, self.max_zoom, clamped);
            self.default_zoom = clamped;
        }

        if !(self.zoom_speed_factor.is_finite() && self.zoom_speed_factor > 0.0) {
            warn!("zoom speed factor {} is not positive, using 1", self.zoom_speed_factor);
            self.zoom_speed_factor = 1.0;
        }
        if self.render_interval_ticks == 0 {
            warn!("render interval of 0 ticks, using 1");
            self.render_interval_ticks = 1;
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            warn!("aspect ratio {} is not positive, using {}", self.aspect_ratio, defaults.aspect_ratio);
            self.aspect_ratio = defaults.aspect_ratio;
        }
        let aspect = self.aspect_ratio.clamp(1.0 / ASPECT_LIMIT, ASPECT_LIMIT);
        if aspect != self.aspect_ratio {
            warn!("aspect ratio {} out of range, using {aspect}", self.aspect_ratio);
            self.aspect_ratio = aspect;
        }
        if self.max_views == 0 {
            self.max_views = 1;
        }
        self
    }

    /// Keep `zoom` inside the configured range
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}
