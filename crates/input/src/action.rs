use std::str::FromStr;

use cityscape_common::CityConfig;

/// Errors from parsing a `key=value` control string.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ControlError {
    #[error("expected `key=value`, got {0:?}")]
    Malformed(String),
    #[error("unknown parameter {0:?}")]
    UnknownParameter(String),
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

/// A change requested by a control panel.
///
/// Every tunable parameter has one variant. Applying an action only edits a
/// config; the caller hands the result to the streaming controller, which
/// validates it.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    SetCitySize(f32),
    SetSectionLength(f32),
    SetGridDivisions(usize),
    SetMinBuildingHeight(f32),
    SetMaxBuildingHeight(f32),
    SetZoomSpeed(f32),
    /// Milliseconds between generation events.
    SetGenerationThreshold(u64),
    SetMaxSections(usize),
    SetMinVisibleSections(usize),
}

impl ControlAction {
    /// Write the action into `config`. Returns whether anything changed.
    pub fn apply(&self, config: &mut CityConfig) -> bool {
        fn set<T: PartialEq + Copy>(slot: &mut T, value: T) -> bool {
            let changed = *slot != value;
            *slot = value;
            changed
        }

        let changed = match *self {
            Self::SetCitySize(v) => set(&mut config.city_size, v),
            Self::SetSectionLength(v) => set(&mut config.section_length, v),
            Self::SetGridDivisions(v) => set(&mut config.grid_divisions, v),
            Self::SetMinBuildingHeight(v) => set(&mut config.min_building_height, v),
            Self::SetMaxBuildingHeight(v) => set(&mut config.max_building_height, v),
            Self::SetZoomSpeed(v) => set(&mut config.zoom_speed, v),
            Self::SetGenerationThreshold(v) => set(&mut config.section_generation_threshold_ms, v),
            Self::SetMaxSections(v) => set(&mut config.max_sections, v),
            Self::SetMinVisibleSections(v) => set(&mut config.min_visible_sections, v),
        };
        if changed {
            tracing::debug!(action = ?self, "control applied");
        }
        changed
    }
}

impl FromStr for ControlAction {
    type Err = ControlError;

    /// Parse `key=value`, with keys named after the config fields.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| ControlError::Malformed(s.to_string()))?;
        let (key, value) = (key.trim(), value.trim());

        fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ControlError> {
            value.parse().map_err(|_| ControlError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            })
        }

        Ok(match key {
            "city_size" => Self::SetCitySize(parse(key, value)?),
            "section_length" => Self::SetSectionLength(parse(key, value)?),
            "grid_divisions" => Self::SetGridDivisions(parse(key, value)?),
            "min_building_height" => Self::SetMinBuildingHeight(parse(key, value)?),
            "max_building_height" => Self::SetMaxBuildingHeight(parse(key, value)?),
            "zoom_speed" => Self::SetZoomSpeed(parse(key, value)?),
            "section_generation_threshold_ms" => Self::SetGenerationThreshold(parse(key, value)?),
            "max_sections" => Self::SetMaxSections(parse(key, value)?),
            "min_visible_sections" => Self::SetMinVisibleSections(parse(key, value)?),
            other => return Err(ControlError::UnknownParameter(other.to_string())),
        })
    }
}
