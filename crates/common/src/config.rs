//! Tunable parameters for section generation and streaming.
//!
//! Every field may be changed while the scene runs. Values are read on the
//! next frame or the next section build, so a control surface can write them
//! freely between frames.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Top-level city configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// Width of the city across the travel axis, in world units.
    pub city_size: f32,
    /// Length of one section along the travel axis.
    pub section_length: f32,
    /// Cells per side of a section's placement grid.
    pub grid_divisions: usize,
    pub min_building_height: f32,
    pub max_building_height: f32,
    /// Distance the camera travels toward -Z each frame.
    pub zoom_speed: f32,
    /// Minimum spacing between two generation events.
    pub section_generation_threshold_ms: u64,
    /// Live sections above this count become eligible for eviction.
    pub max_sections: usize,
    /// Sections that must stay ahead of the camera.
    pub min_visible_sections: usize,
    /// Section lengths behind the camera before a section is out of view.
    pub trailing_sections: u32,
    /// Number of building archetypes in the geometry catalog.
    pub archetype_count: usize,
    /// Seed for every random draw made by the generator.
    pub seed: u64,
    pub placement: PlacementConfig,
    pub camera: CameraConfig,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            city_size: 500.0,
            section_length: 500.0,
            grid_divisions: 30,
            min_building_height: 10.0,
            max_building_height: 30.0,
            zoom_speed: 0.8,
            section_generation_threshold_ms: 200,
            max_sections: 8,
            min_visible_sections: 4,
            trailing_sections: 3,
            archetype_count: 10,
            seed: 42,
            placement: PlacementConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

/// Constants of the two-phase placement heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Chance that a lattice cell is considered for a building.
    pub regular_probability: f64,
    /// Chance that a free corner cell accepts a building.
    pub corner_probability: f64,
    /// Share of each axis covered by a corner region.
    pub corner_fraction: f32,
    /// Uniform scale applied to corner buildings.
    pub corner_scale: f32,
    /// Random cells tried per corner building before giving up.
    pub corner_attempts: u32,
    /// Corner buildings per corner is `base + uniform[0, extra)`.
    pub corner_base_count: u32,
    pub corner_extra_count: u32,
    /// Footprint side as a share of the cell size; the rest is street.
    pub footprint_fill: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            regular_probability: 0.6,
            corner_probability: 0.7,
            corner_fraction: 0.2,
            corner_scale: 0.85,
            corner_attempts: 15,
            corner_base_count: 15,
            corner_extra_count: 10,
            footprint_fill: 0.95,
        }
    }
}

/// Travel camera behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub start_position: Vec3,
    /// Height the camera eases toward when the pointer is centered.
    pub base_height: f32,
    /// Share of the remaining height gap closed each frame.
    pub height_easing: f32,
    /// Radians of rotation per unit of look bias.
    pub look_sensitivity: f32,
    /// Height offset applied at the pointer's vertical extreme.
    pub pointer_height_range: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_position: Vec3::new(0.0, 3000.0, 20.0),
            base_height: 30.0,
            height_easing: 0.05,
            look_sensitivity: 0.02,
            pointer_height_range: 5.0,
            fov_degrees: 40.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

impl CityConfig {
    /// Load a config file, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        tracing::debug!(path = %path.display(), "loaded city config");
        Ok(config)
    }

    /// Parse and validate YAML.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject configurations the generator cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("city_size", self.city_size)?;
        positive("section_length", self.section_length)?;
        finite("zoom_speed", self.zoom_speed)?;
        if self.grid_divisions == 0 {
            return Err(ConfigError::invalid("grid_divisions", "must be at least 1"));
        }
        finite("min_building_height", self.min_building_height)?;
        finite("max_building_height", self.max_building_height)?;
        if self.min_building_height < 0.0 {
            return Err(ConfigError::invalid(
                "min_building_height",
                "must not be negative",
            ));
        }
        if self.min_building_height > self.max_building_height {
            return Err(ConfigError::invalid(
                "min_building_height",
                format!(
                    "{} exceeds max_building_height {}",
                    self.min_building_height, self.max_building_height
                ),
            ));
        }
        if self.min_visible_sections == 0 {
            return Err(ConfigError::invalid(
                "min_visible_sections",
                "must be at least 1",
            ));
        }
        if self.max_sections < self.min_visible_sections {
            return Err(ConfigError::invalid(
                "max_sections",
                format!(
                    "{} is below min_visible_sections {}",
                    self.max_sections, self.min_visible_sections
                ),
            ));
        }
        if self.archetype_count == 0 {
            return Err(ConfigError::invalid("archetype_count", "must be at least 1"));
        }

        let p = &self.placement;
        probability("placement.regular_probability", p.regular_probability)?;
        probability("placement.corner_probability", p.corner_probability)?;
        if !(0.0..=0.5).contains(&p.corner_fraction) {
            return Err(ConfigError::invalid(
                "placement.corner_fraction",
                format!("{} is outside [0, 0.5]", p.corner_fraction),
            ));
        }
        positive("placement.corner_scale", p.corner_scale)?;
        if !(p.footprint_fill > 0.0 && p.footprint_fill <= 1.0) {
            return Err(ConfigError::invalid(
                "placement.footprint_fill",
                format!("{} is outside (0, 1]", p.footprint_fill),
            ));
        }

        let c = &self.camera;
        if !c.start_position.is_finite() {
            return Err(ConfigError::invalid("camera.start_position", "must be finite"));
        }
        if !(0.0..=1.0).contains(&c.height_easing) {
            return Err(ConfigError::invalid(
                "camera.height_easing",
                format!("{} is outside [0, 1]", c.height_easing),
            ));
        }
        positive("camera.fov_degrees", c.fov_degrees)?;
        positive("camera.near", c.near)?;
        if c.far <= c.near {
            return Err(ConfigError::invalid("camera.far", "must exceed camera.near"));
        }
        Ok(())
    }

    /// Side of one placement cell across the travel axis.
    pub fn cell_size(&self) -> f32 {
        self.city_size / self.grid_divisions as f32
    }

    /// Depth of one placement row along the travel axis.
    pub fn row_depth(&self) -> f32 {
        self.section_length / self.grid_divisions as f32
    }

    /// Spacing between road lines, on both axes.
    pub fn road_spacing(&self) -> f32 {
        self.city_size / self.grid_divisions as f32
    }

    pub fn generation_threshold(&self) -> Duration {
        Duration::from_millis(self.section_generation_threshold_ms)
    }

    /// Distance behind the camera past which a section may be evicted.
    pub fn trailing_distance(&self) -> f64 {
        f64::from(self.section_length) * f64::from(self.trailing_sections)
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be finite"))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be positive")))
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is outside [0, 1]")))
    }
}
