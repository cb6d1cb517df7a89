//! Shared types and the tunable city configuration.
//!
//! # Invariants
//! - A `CityConfig` that passed `validate` never produces a degenerate grid.
//! - Configuration errors surface at load time, never inside the frame loop.

pub mod config;
pub mod types;

pub use config::{CameraConfig, CityConfig, ConfigError, PlacementConfig};
pub use types::{NodeId, Transform};
