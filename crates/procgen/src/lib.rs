//! Procedural section generation.
//!
//! # Invariants
//! - Every section spans exactly `section_length` along the travel axis.
//! - Archetype geometry is shared, never copied per building.
//! - A road segment belongs to at most one live section or to the pool.
//!
//! All randomness comes from the caller's RNG, so a seed replays the same city.

mod catalog;
mod placement;
mod pool;
mod section;

pub use catalog::{BuildingArchetype, GeometryCatalog};
pub use placement::{
    CellCoord, CornerRegion, PlacementGrid, PlacementKind, PlacementPlanner, PlannedBuilding,
    SectionPlan,
};
pub use pool::{LineSegmentPool, PoolStats};
pub use section::{CitySection, SectionBuilder, SectionRegistry};

pub fn crate_info() -> &'static str {
    "cityscape-procgen v0.1.0"
}
