//! Building placement for one section.
//!
//! Two passes share one occupancy grid. The lattice pass walks every cell
//! outside the middle corridor and keeps buildings apart from their
//! 4-connected neighbors. The corner pass then scatters smaller buildings
//! into the four corner regions with no adjacency rule, so block corners
//! end up denser than the streets between them.

use std::ops::Range;

use cityscape_common::CityConfig;
use glam::Vec3;
use rand::Rng;

use crate::catalog::GeometryCatalog;

/// A cell in a section's placement grid. `x` runs across the city, `z` runs
/// along the travel axis starting at the section's near edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: usize,
    pub z: usize,
}

impl CellCoord {
    pub fn new(x: usize, z: usize) -> Self {
        Self { x, z }
    }
}

/// Square occupancy matrix, built fresh for every section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementGrid {
    divisions: usize,
    occupied: Vec<bool>,
}

impl PlacementGrid {
    pub fn new(divisions: usize) -> Self {
        assert!(divisions > 0, "grid needs at least one division");
        Self {
            divisions,
            occupied: vec![false; divisions * divisions],
        }
    }

    pub fn divisions(&self) -> usize {
        self.divisions
    }

    /// Column kept clear as a central corridor.
    pub fn middle_column(&self) -> usize {
        self.divisions / 2
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.x < self.divisions && cell.z < self.divisions
    }

    /// Out-of-bounds cells read as unoccupied.
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.contains(cell) && self.occupied[self.index(cell)]
    }

    pub fn occupy(&mut self, cell: CellCoord) {
        let index = self.index(cell);
        self.occupied[index] = true;
    }

    /// In-bounds front, back, left and right neighbors.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        const OFFSETS: [(isize, isize); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
        OFFSETS.into_iter().filter_map(move |(dx, dz)| {
            let x = cell.x.checked_add_signed(dx)?;
            let z = cell.z.checked_add_signed(dz)?;
            let neighbor = CellCoord::new(x, z);
            self.contains(neighbor).then_some(neighbor)
        })
    }

    pub fn has_occupied_neighbor(&self, cell: CellCoord) -> bool {
        self.neighbors(cell).any(|n| self.is_occupied(n))
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|o| **o).count()
    }

    fn index(&self, cell: CellCoord) -> usize {
        cell.z * self.divisions + cell.x
    }
}

/// One of the four dense corner regions, in fractional cell units.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerRegion {
    pub x: Range<f32>,
    pub z: Range<f32>,
}

impl CornerRegion {
    /// The four corners, each covering `fraction` of both axes.
    pub fn corners(divisions: usize, fraction: f32) -> [CornerRegion; 4] {
        let d = divisions as f32;
        let near = 0.0..d * fraction;
        let far = d * (1.0 - fraction)..d;
        [
            CornerRegion {
                x: near.clone(),
                z: near.clone(),
            },
            CornerRegion {
                x: far.clone(),
                z: near.clone(),
            },
            CornerRegion {
                x: near.clone(),
                z: far.clone(),
            },
            CornerRegion { x: far.clone(), z: far },
        ]
    }

    /// Uniformly random cell whose fractional coordinates fall in the region.
    pub fn sample(&self, rng: &mut impl Rng) -> CellCoord {
        let pick = |axis: &Range<f32>, r: f64| {
            let (start, end) = (f64::from(axis.start), f64::from(axis.end));
            (start + r * (end - start)).floor() as usize
        };
        let x = pick(&self.x, rng.gen_range(0.0..1.0));
        let z = pick(&self.z, rng.gen_range(0.0..1.0));
        CellCoord::new(x, z)
    }
}

/// Which pass placed a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    Lattice,
    Corner,
}

/// A building the planner decided to place.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedBuilding {
    pub cell: CellCoord,
    /// Ground-level center of the cell, relative to the section's near edge.
    pub position: Vec3,
    /// Index into the geometry catalog.
    pub archetype: usize,
    pub scale: f32,
    pub kind: PlacementKind,
}

/// Output of planning one section.
#[derive(Debug, Clone)]
pub struct SectionPlan {
    pub grid: PlacementGrid,
    pub buildings: Vec<PlannedBuilding>,
    /// Corner buildings dropped after exhausting their attempts.
    pub corner_skips: usize,
}

impl SectionPlan {
    pub fn count(&self, kind: PlacementKind) -> usize {
        self.buildings.iter().filter(|b| b.kind == kind).count()
    }
}

/// Decides which cells of a section receive buildings.
pub struct PlacementPlanner<'a> {
    config: &'a CityConfig,
    catalog: &'a GeometryCatalog,
}

impl<'a> PlacementPlanner<'a> {
    pub fn new(config: &'a CityConfig, catalog: &'a GeometryCatalog) -> Self {
        Self { config, catalog }
    }

    /// Plan one section. Positions are local to the section's near edge, so
    /// the plan does not depend on where the section sits.
    pub fn plan(&self, rng: &mut impl Rng) -> SectionPlan {
        let mut plan = SectionPlan {
            grid: PlacementGrid::new(self.config.grid_divisions),
            buildings: Vec::new(),
            corner_skips: 0,
        };
        self.place_lattice(&mut plan, rng);
        self.place_corners(&mut plan, rng);
        tracing::trace!(
            lattice = plan.count(PlacementKind::Lattice),
            corner = plan.count(PlacementKind::Corner),
            skipped = plan.corner_skips,
            "planned section"
        );
        plan
    }

    /// Ground center of `cell`. The near edge is `z = 0` and the section
    /// extends toward -Z.
    pub fn cell_center(&self, cell: CellCoord) -> Vec3 {
        let cell_size = self.config.cell_size();
        let row_depth = self.config.row_depth();
        Vec3::new(
            -self.config.city_size / 2.0 + cell.x as f32 * cell_size + cell_size / 2.0,
            0.0,
            -(cell.z as f32 * row_depth + row_depth / 2.0),
        )
    }

    fn place_lattice(&self, plan: &mut SectionPlan, rng: &mut impl Rng) {
        let divisions = plan.grid.divisions();
        let middle = plan.grid.middle_column();
        let p = self.config.placement.regular_probability;

        for x in 0..divisions {
            if x == middle {
                continue;
            }
            for z in 0..divisions {
                let cell = CellCoord::new(x, z);
                if !rng.gen_bool(p) || plan.grid.is_occupied(cell) {
                    continue;
                }
                if plan.grid.has_occupied_neighbor(cell) {
                    continue;
                }
                plan.grid.occupy(cell);
                plan.buildings.push(PlannedBuilding {
                    cell,
                    position: self.cell_center(cell),
                    archetype: self.catalog.pick(rng),
                    scale: 1.0,
                    kind: PlacementKind::Lattice,
                });
            }
        }
    }

    fn place_corners(&self, plan: &mut SectionPlan, rng: &mut impl Rng) {
        let params = &self.config.placement;
        let mut per_corner = params.corner_base_count;
        if params.corner_extra_count > 0 {
            per_corner += rng.gen_range(0..params.corner_extra_count);
        }

        let corners = CornerRegion::corners(plan.grid.divisions(), params.corner_fraction);
        for corner in &corners {
            for _ in 0..per_corner {
                match self.try_corner(corner, &plan.grid, rng) {
                    Some(cell) => {
                        plan.grid.occupy(cell);
                        plan.buildings.push(PlannedBuilding {
                            cell,
                            position: self.cell_center(cell),
                            archetype: self.catalog.pick(rng),
                            scale: params.corner_scale,
                            kind: PlacementKind::Corner,
                        });
                    }
                    None => plan.corner_skips += 1,
                }
            }
        }
    }

    /// Up to `corner_attempts` random draws; the first free cell that passes
    /// the probability gate wins.
    fn try_corner(
        &self,
        corner: &CornerRegion,
        grid: &PlacementGrid,
        rng: &mut impl Rng,
    ) -> Option<CellCoord> {
        let params = &self.config.placement;
        (0..params.corner_attempts).find_map(|_| {
            let cell = corner.sample(rng);
            let accepted = grid.contains(cell)
                && !grid.is_occupied(cell)
                && rng.gen_bool(params.corner_probability);
            accepted.then_some(cell)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup(config: &CityConfig, seed: u64) -> (GeometryCatalog, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let catalog = GeometryCatalog::build(config, &mut rng);
        (catalog, rng)
    }

    fn region_holds(region: &CornerRegion, cell: CellCoord) -> bool {
        let (x, z) = (cell.x as f32, cell.z as f32);
        let covers = |axis: &Range<f32>, v: f32| v >= axis.start.floor() && v < axis.end;
        covers(&region.x, x) && covers(&region.z, z)
    }

    fn in_corner(cell: CellCoord, config: &CityConfig) -> bool {
        CornerRegion::corners(config.grid_divisions, config.placement.corner_fraction)
            .iter()
            .any(|c| region_holds(c, cell))
    }

    #[test]
    fn neighbors_stay_in_bounds() {
        let grid = PlacementGrid::new(3);
        assert_eq!(grid.neighbors(CellCoord::new(0, 0)).count(), 2);
        assert_eq!(grid.neighbors(CellCoord::new(1, 1)).count(), 4);
        assert_eq!(grid.neighbors(CellCoord::new(2, 1)).count(), 3);
    }

    #[test]
    fn occupancy_and_neighbors() {
        let mut grid = PlacementGrid::new(4);
        grid.occupy(CellCoord::new(1, 1));
        assert!(grid.is_occupied(CellCoord::new(1, 1)));
        assert!(grid.has_occupied_neighbor(CellCoord::new(1, 2)));
        assert!(grid.has_occupied_neighbor(CellCoord::new(0, 1)));
        assert!(!grid.has_occupied_neighbor(CellCoord::new(2, 2)));
        assert!(!grid.is_occupied(CellCoord::new(9, 9)));
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn corner_regions_cover_outer_fifth() {
        let corners = CornerRegion::corners(30, 0.2);
        assert_eq!(corners[0], CornerRegion { x: 0.0..6.0, z: 0.0..6.0 });
        assert_eq!(corners[3], CornerRegion { x: 24.0..30.0, z: 24.0..30.0 });

        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..500 {
            let cell = corners[1].sample(&mut rng);
            assert!((24..30).contains(&cell.x));
            assert!(cell.z < 6);
        }
    }

    #[test]
    fn lattice_buildings_never_touch() {
        let config = CityConfig::default();
        for seed in 0..20 {
            let (catalog, mut rng) = setup(&config, seed);
            let plan = PlacementPlanner::new(&config, &catalog).plan(&mut rng);

            let mut lattice = PlacementGrid::new(config.grid_divisions);
            for b in plan.buildings.iter().filter(|b| b.kind == PlacementKind::Lattice) {
                lattice.occupy(b.cell);
            }
            for b in plan.buildings.iter().filter(|b| b.kind == PlacementKind::Lattice) {
                assert!(
                    !lattice.has_occupied_neighbor(b.cell),
                    "seed {seed}: lattice neighbor next to {:?}",
                    b.cell
                );
            }
        }
    }

    #[test]
    fn middle_column_has_no_lattice_buildings() {
        let config = CityConfig::default();
        let middle = config.grid_divisions / 2;
        for seed in 0..20 {
            let (catalog, mut rng) = setup(&config, seed);
            let plan = PlacementPlanner::new(&config, &catalog).plan(&mut rng);
            assert!(
                plan.buildings
                    .iter()
                    .filter(|b| b.kind == PlacementKind::Lattice)
                    .all(|b| b.cell.x != middle)
            );
        }
    }

    #[test]
    fn corner_buildings_are_scaled_and_inside_corners() {
        let config = CityConfig::default();
        let (catalog, mut rng) = setup(&config, 8);
        let plan = PlacementPlanner::new(&config, &catalog).plan(&mut rng);

        let corner: Vec<_> = plan
            .buildings
            .iter()
            .filter(|b| b.kind == PlacementKind::Corner)
            .collect();
        assert!(!corner.is_empty());
        for b in corner {
            assert_eq!(b.scale, 0.85);
            assert!(in_corner(b.cell, &config), "{:?} outside corners", b.cell);
        }
    }

    #[test]
    fn every_building_has_its_own_cell() {
        let config = CityConfig::default();
        let (catalog, mut rng) = setup(&config, 21);
        let plan = PlacementPlanner::new(&config, &catalog).plan(&mut rng);

        let mut cells: Vec<_> = plan.buildings.iter().map(|b| b.cell).collect();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), plan.buildings.len());
        assert_eq!(plan.grid.occupied_count(), plan.buildings.len());
    }

    #[test]
    fn positions_are_local_to_section_near_edge() {
        let config = CityConfig {
            city_size: 300.0,
            section_length: 600.0,
            grid_divisions: 30,
            ..CityConfig::default()
        };
        let (catalog, _) = setup(&config, 0);
        let planner = PlacementPlanner::new(&config, &catalog);

        let p = planner.cell_center(CellCoord::new(0, 0));
        assert_eq!(p, Vec3::new(-145.0, 0.0, -10.0));
        let p = planner.cell_center(CellCoord::new(29, 29));
        assert_eq!(p, Vec3::new(145.0, 0.0, -590.0));
    }

    #[test]
    fn zero_corner_probability_skips_every_corner_building() {
        let mut config = CityConfig::default();
        config.placement.corner_probability = 0.0;
        config.placement.corner_extra_count = 0;
        let (catalog, mut rng) = setup(&config, 2);
        let plan = PlacementPlanner::new(&config, &catalog).plan(&mut rng);

        assert_eq!(plan.count(PlacementKind::Corner), 0);
        assert_eq!(plan.corner_skips, 4 * 15);
    }

    #[test]
    fn each_corner_places_base_plus_random_extra() {
        let mut config = CityConfig {
            grid_divisions: 100,
            ..CityConfig::default()
        };
        config.placement.regular_probability = 0.0;
        config.placement.corner_probability = 1.0;

        let mut totals = Vec::new();
        for seed in 0..40 {
            let (catalog, mut rng) = setup(&config, seed);
            let plan = PlacementPlanner::new(&config, &catalog).plan(&mut rng);
            assert_eq!(plan.corner_skips, 0, "seed {seed}");

            let corners = CornerRegion::corners(100, config.placement.corner_fraction);
            let per_corner: Vec<usize> = corners
                .iter()
                .map(|c| {
                    plan.buildings
                        .iter()
                        .filter(|b| region_holds(c, b.cell))
                        .count()
                })
                .collect();

            // One draw per section, shared by all four corners.
            assert!((15..25).contains(&per_corner[0]), "seed {seed}: {per_corner:?}");
            assert!(per_corner.iter().all(|n| *n == per_corner[0]));
            totals.push(per_corner[0]);
        }
        totals.sort();
        totals.dedup();
        assert!(totals.len() > 1, "extra count never varied: {totals:?}");
    }

    #[test]
    fn full_regular_probability_gives_checkerboard_like_spacing() {
        let mut config = CityConfig {
            grid_divisions: 5,
            ..CityConfig::default()
        };
        config.placement.regular_probability = 1.0;
        config.placement.corner_probability = 0.0;
        let (catalog, mut rng) = setup(&config, 0);
        let plan = PlacementPlanner::new(&config, &catalog).plan(&mut rng);

        // Column-major walk with p = 1 takes every other row in columns 0, 1, 3, 4.
        let mut cells: Vec<_> = plan.buildings.iter().map(|b| (b.cell.x, b.cell.z)).collect();
        cells.sort();
        assert_eq!(
            cells,
            vec![
                (0, 0),
                (0, 2),
                (0, 4),
                (1, 1),
                (1, 3),
                (3, 0),
                (3, 2),
                (3, 4),
                (4, 1),
                (4, 3),
            ]
        );
    }

    #[test]
    fn same_seed_same_plan() {
        let config = CityConfig::default();
        let (catalog, _) = setup(&config, 0);
        let planner = PlacementPlanner::new(&config, &catalog);
        let a = planner.plan(&mut StdRng::seed_from_u64(77));
        let b = planner.plan(&mut StdRng::seed_from_u64(77));
        assert_eq!(a.buildings, b.buildings);
    }
}
