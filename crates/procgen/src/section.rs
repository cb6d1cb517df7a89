use std::collections::VecDeque;
use std::ops::Range;

use cityscape_common::{CityConfig, NodeId, Transform};
use cityscape_render::{LineSegment, MeshInstance, SceneNode, SceneSink};
use glam::{DVec3, Vec3};
use rand::Rng;

use crate::catalog::GeometryCatalog;
use crate::placement::{PlacementKind, PlacementPlanner};
use crate::pool::{LineSegmentPool, PoolStats};

/// Height of road markings above the ground plane.
const ROAD_ELEVATION: f32 = 0.1;

/// One fixed-length slice of city along the travel axis.
///
/// Owns its composed scene node, whose origin sits at `start` on the travel
/// axis. `pooled_lines` is the manifest of lines in that node that came from
/// the segment pool and go back to it on eviction.
#[derive(Debug)]
pub struct CitySection {
    node: SceneNode,
    start: f64,
    end: f64,
    pooled_lines: Range<usize>,
    lattice_buildings: usize,
    corner_buildings: usize,
}

impl CitySection {
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    /// Near edge on the travel axis.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Far edge, always `start - section_length`.
    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn node(&self) -> &SceneNode {
        &self.node
    }

    /// Whether any of the section still lies ahead of a camera at `travel`.
    pub fn is_ahead_of(&self, travel: f64) -> bool {
        self.end < travel
    }

    pub fn pooled_line_count(&self) -> usize {
        self.pooled_lines.len()
    }

    pub fn pooled_lines(&self) -> &[LineSegment] {
        &self.node.lines[self.pooled_lines.clone()]
    }

    pub fn building_count(&self) -> usize {
        self.node.mesh_count()
    }

    pub fn lattice_buildings(&self) -> usize {
        self.lattice_buildings
    }

    pub fn corner_buildings(&self) -> usize {
        self.corner_buildings
    }

    /// Return the manifest's lines to the pool and drop the rest of the node.
    /// Call only after the node has been detached from the scene.
    pub fn reclaim_into(mut self, pool: &mut LineSegmentPool) -> usize {
        pool.release_all(self.node.lines.drain(self.pooled_lines.clone()))
    }
}

/// Live sections in creation order, oldest first. Start coordinates strictly
/// decrease from front to back.
#[derive(Debug, Default)]
pub struct SectionRegistry {
    sections: VecDeque<CitySection>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: CitySection) {
        debug_assert!(
            self.sections
                .back()
                .is_none_or(|last| section.start() < last.start()),
            "sections must be appended in travel order"
        );
        self.sections.push_back(section);
    }

    pub fn oldest(&self) -> Option<&CitySection> {
        self.sections.front()
    }

    pub fn newest(&self) -> Option<&CitySection> {
        self.sections.back()
    }

    pub fn pop_oldest(&mut self) -> Option<CitySection> {
        self.sections.pop_front()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CitySection> {
        self.sections.iter()
    }

    /// Sections that still extend ahead of a camera at `travel`.
    pub fn count_ahead_of(&self, travel: f64) -> usize {
        self.sections.iter().filter(|s| s.is_ahead_of(travel)).count()
    }

    /// Pool-eligible lines currently held by live sections.
    pub fn pooled_lines_in_use(&self) -> usize {
        self.sections.iter().map(|s| s.pooled_line_count()).sum()
    }
}

/// Composes road grids and planned buildings into sections.
///
/// Owns the geometry catalog and the road segment pool.
#[derive(Debug)]
pub struct SectionBuilder {
    catalog: GeometryCatalog,
    pool: LineSegmentPool,
}

impl SectionBuilder {
    pub fn new(config: &CityConfig, rng: &mut impl Rng) -> Self {
        Self {
            catalog: GeometryCatalog::build(config, rng),
            pool: LineSegmentPool::new(),
        }
    }

    pub fn catalog(&self) -> &GeometryCatalog {
        &self.catalog
    }

    pub fn pool(&self) -> &LineSegmentPool {
        &self.pool
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Rebuild the catalog if the config's cell size, height range or
    /// archetype count moved away from it. Returns whether it was rebuilt.
    pub fn refresh_catalog(&mut self, config: &CityConfig, rng: &mut impl Rng) -> bool {
        if self.catalog.matches(config) {
            return false;
        }
        self.catalog = GeometryCatalog::build(config, rng);
        true
    }

    /// Build the section starting at `start`, append it to `registry` and
    /// attach its node to `scene`.
    pub fn build_section(
        &mut self,
        start: f64,
        config: &CityConfig,
        rng: &mut impl Rng,
        registry: &mut SectionRegistry,
        scene: &mut impl SceneSink,
    ) -> NodeId {
        let mut section = self.assemble(start, config, rng);
        scene.attach(&mut section.node);
        let id = section.id();
        tracing::debug!(
            section = %id.short(),
            start = section.start,
            end = section.end,
            buildings = section.building_count(),
            "built section"
        );
        registry.push(section);
        id
    }

    /// Build a section without registering or attaching it.
    pub fn assemble(&mut self, start: f64, config: &CityConfig, rng: &mut impl Rng) -> CitySection {
        let mut node = SceneNode::at(DVec3::new(0.0, 0.0, start));
        let pooled_lines = self.lay_roads(&mut node, config);

        let plan = PlacementPlanner::new(config, &self.catalog).plan(rng);
        for building in &plan.buildings {
            let Some(archetype) = self.catalog.get(building.archetype) else {
                continue;
            };
            node.meshes.push(MeshInstance::new(
                Transform::placed(building.position, building.scale),
                archetype.footprint.clone(),
                archetype.outline.clone(),
            ));
        }

        CitySection {
            node,
            start,
            end: start - f64::from(config.section_length),
            pooled_lines,
            lattice_buildings: plan.count(PlacementKind::Lattice),
            corner_buildings: plan.count(PlacementKind::Corner),
        }
    }

    /// Return a detached section's pooled lines to the pool.
    pub fn reclaim(&mut self, section: CitySection) -> usize {
        section.reclaim_into(&mut self.pool)
    }

    /// Horizontal lines first (pooled), then verticals (always fresh). Both
    /// are local to the node, running from `z = 0` to `z = -section_length`.
    fn lay_roads(&mut self, node: &mut SceneNode, config: &CityConfig) -> Range<usize> {
        let spacing = config.road_spacing();
        let half_width = config.city_size / 2.0;
        let length = config.section_length;

        for i in 0..horizontal_line_count(length, spacing) {
            let z = -(i as f32 * spacing);
            node.lines.push(self.pool.acquire(
                Vec3::new(-half_width, ROAD_ELEVATION, z),
                Vec3::new(half_width, ROAD_ELEVATION, z),
            ));
        }
        let pooled = 0..node.lines.len();

        for i in 0..=config.grid_divisions {
            let x = -half_width + i as f32 * spacing;
            node.lines.push(LineSegment::new(
                Vec3::new(x, ROAD_ELEVATION, 0.0),
                Vec3::new(x, ROAD_ELEVATION, -length),
            ));
        }
        pooled
    }
}

/// Lines at `0, spacing, 2*spacing, ...` up to and including `length`.
fn horizontal_line_count(length: f32, spacing: f32) -> usize {
    ((length / spacing) + 1e-4).floor() as usize + 1
}
