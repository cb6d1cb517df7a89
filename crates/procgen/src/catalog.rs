use std::sync::Arc;

use cityscape_common::CityConfig;
use cityscape_render::{BoxGeometry, EdgesGeometry};
use rand::Rng;

/// A reusable building template.
///
/// Geometry is built once and shared by reference with every building that
/// uses the template.
#[derive(Debug, Clone)]
pub struct BuildingArchetype {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub footprint: Arc<BoxGeometry>,
    pub outline: Arc<EdgesGeometry>,
}

impl BuildingArchetype {
    pub fn new(width: f32, depth: f32, height: f32) -> Self {
        let footprint = BoxGeometry::new(width, height, depth);
        let outline = EdgesGeometry::from_box(&footprint);
        Self {
            width,
            depth,
            height,
            footprint: Arc::new(footprint),
            outline: Arc::new(outline),
        }
    }
}

/// Fixed set of archetypes with randomized heights.
#[derive(Debug, Clone)]
pub struct GeometryCatalog {
    archetypes: Vec<BuildingArchetype>,
    side: f32,
    min_height: f32,
    max_height: f32,
}

impl GeometryCatalog {
    /// Build `config.archetype_count` archetypes sized for the config's cells.
    pub fn build(config: &CityConfig, rng: &mut impl Rng) -> Self {
        Self::build_with(
            config.archetype_count,
            config.cell_size() * config.placement.footprint_fill,
            config.min_building_height,
            config.max_building_height,
            rng,
        )
    }

    /// Build `count` square-footprint archetypes with side `side` and heights
    /// drawn uniformly from `[min_height, max_height]`.
    pub fn build_with(
        count: usize,
        side: f32,
        min_height: f32,
        max_height: f32,
        rng: &mut impl Rng,
    ) -> Self {
        assert!(count > 0, "catalog needs at least one archetype");
        let archetypes = (0..count)
            .map(|_| {
                let height = min_height + rng.gen_range(0.0f32..1.0) * (max_height - min_height);
                BuildingArchetype::new(side, side, height)
            })
            .collect();
        tracing::debug!(count, side, min_height, max_height, "built geometry catalog");
        Self {
            archetypes,
            side,
            min_height,
            max_height,
        }
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BuildingArchetype> {
        self.archetypes.get(index)
    }

    pub fn archetypes(&self) -> &[BuildingArchetype] {
        &self.archetypes
    }

    /// Uniformly random archetype index.
    pub fn pick(&self, rng: &mut impl Rng) -> usize {
        rng.gen_range(0..self.archetypes.len())
    }

    /// Whether the catalog was built for the config's cell size, height
    /// range and archetype count.
    pub fn matches(&self, config: &CityConfig) -> bool {
        self.archetypes.len() == config.archetype_count
            && self.side == config.cell_size() * config.placement.footprint_fill
            && self.min_height == config.min_building_height
            && self.max_height == config.max_building_height
    }
}
