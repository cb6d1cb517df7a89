use std::time::Duration;

use cityscape_common::NodeId;
use cityscape_procgen::{CitySection, PlacementKind, PoolStats, SectionPlan};
use cityscape_stream::{StreamController, StreamingState};

/// Read-only views over streaming state for debugging and profiling.
pub struct StreamInspector;

impl StreamInspector {
    /// Produce a summary of the streaming state.
    pub fn summary(controller: &StreamController, state: &StreamingState) -> StreamSummary {
        StreamSummary {
            frame: state.frame(),
            travel: state.travel(),
            camera_height: state.camera.position.y,
            live_sections: state.sections().len(),
            sections_ahead: state.sections().count_ahead_of(state.travel()),
            farthest_generated: state.farthest_generated(),
            pool: controller.pool_stats(),
            average_step: controller.timer().average(),
        }
    }

    /// One entry per live section, oldest first.
    pub fn sections(state: &StreamingState) -> Vec<SectionInfo> {
        state.sections().iter().map(SectionInfo::from).collect()
    }

    /// ASCII map of a plan: one row per grid row, nearest row first.
    /// `#` lattice building, `c` corner building, `|` empty middle corridor,
    /// `.` empty cell.
    pub fn placement_map(plan: &SectionPlan) -> String {
        let n = plan.grid.divisions();
        let middle = plan.grid.middle_column();
        let mut rows = vec![vec!['.'; n]; n];
        for row in &mut rows {
            row[middle] = '|';
        }
        for building in &plan.buildings {
            rows[building.cell.z][building.cell.x] = match building.kind {
                PlacementKind::Lattice => '#',
                PlacementKind::Corner => 'c',
            };
        }
        rows.into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Summary of streaming state for the inspector.
#[derive(Debug, Clone)]
pub struct StreamSummary {
    pub frame: u64,
    pub travel: f64,
    pub camera_height: f64,
    pub live_sections: usize,
    pub sections_ahead: usize,
    pub farthest_generated: f64,
    pub pool: PoolStats,
    pub average_step: Duration,
}

impl std::fmt::Display for StreamSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Stream: frame={} z={:.1} y={:.1} live={} ahead={} next_start={:.0} pool(pooled={} built={} reused={}) step={:?}",
            self.frame,
            self.travel,
            self.camera_height,
            self.live_sections,
            self.sections_ahead,
            self.farthest_generated,
            self.pool.pooled,
            self.pool.constructed,
            self.pool.reused,
            self.average_step,
        )
    }
}

/// Detailed info about a single live section.
#[derive(Debug, Clone)]
pub struct SectionInfo {
    pub id: NodeId,
    pub start: f64,
    pub end: f64,
    pub lattice_buildings: usize,
    pub corner_buildings: usize,
    pub pooled_lines: usize,
}

impl From<&CitySection> for SectionInfo {
    fn from(section: &CitySection) -> Self {
        Self {
            id: section.id(),
            start: section.start(),
            end: section.end(),
            lattice_buildings: section.lattice_buildings(),
            corner_buildings: section.corner_buildings(),
            pooled_lines: section.pooled_line_count(),
        }
    }
}

impl std::fmt::Display for SectionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Section [{}] z=({:.0} .. {:.0}) buildings={} (lattice={} corner={}) pooled_lines={}",
            self.id.short(),
            self.start,
            self.end,
            self.lattice_buildings + self.corner_buildings,
            self.lattice_buildings,
            self.corner_buildings,
            self.pooled_lines,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityscape_common::CityConfig;
    use cityscape_procgen::{CellCoord, PlacementGrid, PlannedBuilding};
    use cityscape_render::RecordingScene;

    #[test]
    fn summary_after_start() {
        let mut controller = StreamController::new(CityConfig::default());
        let mut scene = RecordingScene::new();
        let state = controller.start(&mut scene);

        let summary = StreamInspector::summary(&controller, &state);
        assert_eq!(summary.frame, 0);
        assert_eq!(summary.live_sections, 4);
        assert_eq!(summary.sections_ahead, 4);
        assert_eq!(summary.farthest_generated, -2000.0);
        assert_eq!(summary.pool.constructed, 4 * 31);
        assert!(format!("{summary}").contains("live=4"));
    }

    #[test]
    fn sections_listed_oldest_first() {
        let mut controller = StreamController::new(CityConfig::default());
        let mut scene = RecordingScene::new();
        let mut state = controller.start(&mut scene);
        controller.step(&mut state, Duration::from_millis(16), &mut scene);

        let infos = StreamInspector::sections(&state);
        assert_eq!(infos.len(), 4);
        assert_eq!(infos[0].start, 0.0);
        assert_eq!(infos[3].end, -2000.0);
        assert!(format!("{}", infos[0]).contains("pooled_lines=31"));
    }

    #[test]
    fn placement_map_marks_cells() {
        let mut grid = PlacementGrid::new(3);
        grid.occupy(CellCoord::new(0, 0));
        grid.occupy(CellCoord::new(2, 2));
        let building = |x, z, kind| PlannedBuilding {
            cell: CellCoord::new(x, z),
            position: Default::default(),
            archetype: 0,
            scale: 1.0,
            kind,
        };
        let plan = SectionPlan {
            grid,
            buildings: vec![
                building(0, 0, PlacementKind::Lattice),
                building(2, 2, PlacementKind::Corner),
            ],
            corner_skips: 0,
        };

        assert_eq!(StreamInspector::placement_map(&plan), "#|.\n.|.\n.|c");
    }
}
