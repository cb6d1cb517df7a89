use std::time::{Duration, Instant};

use cityscape_common::{CityConfig, ConfigError, NodeId};
use cityscape_procgen::{CitySection, PoolStats, SectionBuilder, SectionRegistry};
use cityscape_render::{Camera, SceneSink};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::timer::FrameTimer;

/// Frames kept in the step-duration window.
const TIMER_WINDOW: usize = 120;

/// Everything that changes from frame to frame.
///
/// Only the controller mutates it, except `camera.target_height` and
/// `camera.look_bias`, which a control layer may write between frames.
#[derive(Debug)]
pub struct StreamingState {
    pub camera: Camera,
    farthest_generated: f64,
    last_generation: Option<Duration>,
    sections: SectionRegistry,
    frame: u64,
}

impl StreamingState {
    /// Start coordinate the next generated section will use.
    pub fn farthest_generated(&self) -> f64 {
        self.farthest_generated
    }

    /// Timestamp of the last generation triggered by `step`.
    pub fn last_generation(&self) -> Option<Duration> {
        self.last_generation
    }

    pub fn sections(&self) -> &SectionRegistry {
        &self.sections
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn travel(&self) -> f64 {
        self.camera.travel()
    }
}

/// Where a section sits on the travel axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionExtent {
    pub id: NodeId,
    pub start: f64,
    pub end: f64,
}

impl From<&CitySection> for SectionExtent {
    fn from(section: &CitySection) -> Self {
        Self {
            id: section.id(),
            start: section.start(),
            end: section.end(),
        }
    }
}

/// What one step changed.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub generated: Option<SectionExtent>,
    pub evicted: Vec<SectionExtent>,
}

/// Per-frame streaming statistics for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    pub frame: u64,
    pub sections_generated_this_frame: usize,
    pub sections_evicted_this_frame: usize,
    pub segments_reclaimed_this_frame: usize,
    pub live_sections: usize,
    pub sections_ahead: usize,
    pub pooled_segments: usize,
    pub frame_time: Duration,
}

/// Per-frame control loop: moves the camera, keeps enough sections ahead of
/// it and evicts sections that fell far enough behind.
pub struct StreamController<R = StdRng> {
    config: CityConfig,
    builder: SectionBuilder,
    rng: R,
    stats: StreamStats,
    timer: FrameTimer,
}

impl StreamController<StdRng> {
    /// Controller seeded from `config.seed`.
    pub fn new(config: CityConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> StreamController<R> {
    pub fn with_rng(config: CityConfig, mut rng: R) -> Self {
        let builder = SectionBuilder::new(&config, &mut rng);
        Self {
            config,
            builder,
            rng,
            stats: StreamStats::default(),
            timer: FrameTimer::new(TIMER_WINDOW),
        }
    }

    /// Place the camera and pre-build `min_visible_sections` sections
    /// starting at the origin.
    pub fn start(&mut self, scene: &mut impl SceneSink) -> StreamingState {
        let mut state = StreamingState {
            camera: Camera::from_config(&self.config.camera),
            farthest_generated: 0.0,
            last_generation: None,
            sections: SectionRegistry::new(),
            frame: 0,
        };
        for _ in 0..self.config.min_visible_sections {
            self.generate(&mut state, scene);
        }
        tracing::info!(
            sections = state.sections.len(),
            farthest = state.farthest_generated,
            "streaming started"
        );
        state
    }

    /// Run one frame at timestamp `now` (time since the scene started).
    pub fn step(
        &mut self,
        state: &mut StreamingState,
        now: Duration,
        scene: &mut impl SceneSink,
    ) -> FrameReport {
        let _span = tracing::info_span!("stream_step", frame = state.frame).entered();
        let frame_start = Instant::now();
        state.frame += 1;

        let camera = &self.config.camera;
        state.camera.advance(self.config.zoom_speed);
        state.camera.ease_height(camera.height_easing);
        state.camera.apply_look_bias(camera.look_sensitivity);

        let mut report = FrameReport::default();
        if self.should_generate(state, now) {
            report.generated = Some(self.generate(state, scene));
            state.last_generation = Some(now);
        }
        let reclaimed = self.evict(state, scene, &mut report.evicted);

        self.stats = StreamStats {
            frame: state.frame,
            sections_generated_this_frame: usize::from(report.generated.is_some()),
            sections_evicted_this_frame: report.evicted.len(),
            segments_reclaimed_this_frame: reclaimed,
            live_sections: state.sections.len(),
            sections_ahead: state.sections.count_ahead_of(state.travel()),
            pooled_segments: self.builder.pool().len(),
            frame_time: frame_start.elapsed(),
        };
        self.timer.record(self.stats.frame_time);

        tracing::trace!(
            travel = state.travel(),
            live = self.stats.live_sections,
            ahead = self.stats.sections_ahead,
            pooled = self.stats.pooled_segments,
            "stream step complete"
        );
        report
    }

    /// Too few sections ahead of the camera, and the last generation is at
    /// least one threshold in the past.
    pub fn should_generate(&self, state: &StreamingState, now: Duration) -> bool {
        let ahead = state.sections.count_ahead_of(state.travel());
        if ahead >= self.config.min_visible_sections {
            return false;
        }
        state
            .last_generation
            .is_none_or(|last| now.saturating_sub(last) >= self.config.generation_threshold())
    }

    /// Detach every live section and reclaim its road segments. The state
    /// stays valid but empty; stepping it again rebuilds from the section
    /// boundary at or just behind the camera, one section per step.
    pub fn teardown(&mut self, state: &mut StreamingState, scene: &mut impl SceneSink) -> usize {
        let mut removed = 0;
        while let Some(section) = state.sections.pop_oldest() {
            scene.detach(section.node());
            self.builder.reclaim(section);
            removed += 1;
        }
        let length = f64::from(self.config.section_length);
        state.farthest_generated = (state.travel() / length).ceil() * length;
        state.last_generation = None;
        tracing::info!(removed, pooled = self.builder.pool().len(), "streaming torn down");
        removed
    }

    pub fn config(&self) -> &CityConfig {
        &self.config
    }

    /// Swap in a new configuration, taking effect on the next step. Returns
    /// whether the geometry catalog had to be rebuilt.
    pub fn set_config(&mut self, config: CityConfig) -> Result<bool, ConfigError> {
        config.validate()?;
        self.config = config;
        let rebuilt = self.builder.refresh_catalog(&self.config, &mut self.rng);
        if rebuilt {
            tracing::debug!(archetypes = self.builder.catalog().len(), "catalog rebuilt");
        }
        Ok(rebuilt)
    }

    pub fn builder(&self) -> &SectionBuilder {
        &self.builder
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.builder.pool_stats()
    }

    /// Statistics from the last step.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    fn generate(
        &mut self,
        state: &mut StreamingState,
        scene: &mut impl SceneSink,
    ) -> SectionExtent {
        let start = state.farthest_generated;
        let id = self.builder.build_section(
            start,
            &self.config,
            &mut self.rng,
            &mut state.sections,
            scene,
        );
        let end = start - f64::from(self.config.section_length);
        state.farthest_generated = end;
        SectionExtent { id, start, end }
    }

    /// Evict from the oldest end while the registry is over budget and the
    /// oldest section is past the trailing window. Stops at the first
    /// section still inside the window.
    fn evict(
        &mut self,
        state: &mut StreamingState,
        scene: &mut impl SceneSink,
        evicted: &mut Vec<SectionExtent>,
    ) -> usize {
        let boundary = state.travel() + self.config.trailing_distance();
        let mut reclaimed = 0;
        while state.sections.len() > self.config.max_sections {
            match state.sections.oldest() {
                Some(oldest) if oldest.end() > boundary => {}
                _ => break,
            }
            let Some(section) = state.sections.pop_oldest() else {
                break;
            };
            scene.detach(section.node());
            let extent = SectionExtent::from(&section);
            let segments = self.builder.reclaim(section);
            tracing::debug!(
                section = %extent.id.short(),
                end = extent.end,
                segments,
                "evicted section"
            );
            reclaimed += segments;
            evicted.push(extent);
        }
        reclaimed
    }
}
