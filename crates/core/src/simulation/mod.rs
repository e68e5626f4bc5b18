//! Wind particle engine
//!
//! `WindEngine` ties the pieces together for a render host:
//! - [`WindFieldStore`] holds the active field and coordinates loads
//! - [`ParticleSystem`] advects the particle pool through it
//! - [`UpdateScheduler`] limits steps to a fixed rate
//! - [`TrailBufferBuilder`] keeps the vertex and colour buffers current
//!
//! Every field change (direct or via a completed load) reseeds all particles,
//! so a level or time-step switch shows the new data immediately.

pub mod particle;
pub mod particle_system;
pub mod scheduler;
pub mod trail_buffer;

pub use particle::{Particle, Trail};
pub use particle_system::{ParticleSystem, SeedOutcome, SystemState, UpdateStats, ViewMode};
pub use scheduler::UpdateScheduler;
pub use trail_buffer::TrailBufferBuilder;

use crate::config::EngineConfig;
use crate::core_types::{LevelId, Rgb, Roi};
use crate::error::Result;
use crate::grid::{
    FieldProvider, LoadPlan, LoadProgress, LoadTicket, WindField, WindFieldStore, WindLevel,
};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// What a call to [`WindEngine::tick`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Gated by the scheduler (too soon, or disabled)
    Skipped,
    Stepped(UpdateStats),
}

/// Particle trail engine driven by host ticks
#[derive(Debug)]
pub struct WindEngine {
    config: EngineConfig,
    store: WindFieldStore,
    particles: ParticleSystem,
    scheduler: UpdateScheduler,
    builder: TrailBufferBuilder,
    vertices: Vec<f32>,
    colors: Vec<f32>,
    epoch: Instant,
}

impl WindEngine {
    /// Create an engine with an empty field.
    ///
    /// All buffers are allocated here and never resized.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let particles = ParticleSystem::new(&config)?;
        let builder = TrailBufferBuilder::new(config.particles.trail_capacity);
        let buffer_len = builder.required_len(config.particles.count);

        let mut engine = Self {
            store: WindFieldStore::new(config.altitudes),
            particles,
            scheduler: UpdateScheduler::new(Duration::from_millis(config.update_interval_ms)),
            builder,
            vertices: vec![0.0; buffer_len],
            colors: vec![0.0; buffer_len],
            epoch: Instant::now(),
            config,
        };
        engine.rebuild_buffers();
        Ok(engine)
    }

    /// Create an engine and install `field` right away
    pub fn with_field(config: EngineConfig, field: WindField) -> Result<Self> {
        let mut engine = Self::new(config)?;
        engine.set_wind_field(field);
        Ok(engine)
    }

    /// Replace the active field and reseed every particle against it.
    ///
    /// Any load still in flight becomes stale.
    pub fn set_wind_field(&mut self, field: WindField) -> SeedOutcome {
        self.store.install(field);
        self.on_field_installed()
    }

    /// Open a load; see [`WindFieldStore::begin_load`]
    pub fn begin_load(&mut self, plan: LoadPlan, time_step: impl Into<String>) -> LoadTicket {
        self.store.begin_load(plan, time_step)
    }

    /// Submit one level's payload. Reseeds when this completes the load.
    pub fn submit_level(
        &mut self,
        ticket: &LoadTicket,
        level: LevelId,
        json: &str,
    ) -> Result<LoadProgress> {
        self.submit_generation(ticket.generation, level, json)
    }

    /// Submit one level's payload by generation number
    pub fn submit_generation(
        &mut self,
        generation: u64,
        level: LevelId,
        json: &str,
    ) -> Result<LoadProgress> {
        let progress = self.store.submit_generation(generation, level, json)?;
        self.after_submit(progress);
        Ok(progress)
    }

    pub fn abandon_load(&mut self, generation: u64) -> bool {
        self.store.abandon(generation)
    }

    /// Fetch and install every level of `plan` through `provider`.
    ///
    /// Levels are fetched and validated in parallel; the field is replaced
    /// only after all of them succeeded. On any failure the load is abandoned
    /// and the active field is left as it was.
    pub fn load_with_provider<P: FieldProvider + ?Sized>(
        &mut self,
        provider: &P,
        plan: LoadPlan,
        time_step: &str,
    ) -> Result<LoadProgress> {
        let ticket = self.store.begin_load(plan, time_step);
        let altitudes = *self.store.altitudes();

        let fetched: Result<Vec<WindLevel>> = plan
            .levels()
            .par_iter()
            .map(|&level| {
                let json = provider.fetch(level, time_step)?;
                WindLevel::from_json(level, &json, altitudes.altitude(level))
            })
            .collect();

        let levels = match fetched {
            Ok(levels) => levels,
            Err(err) => {
                warn!("Wind load gen={} failed: {}", ticket.generation, err);
                self.store.abandon(ticket.generation);
                return Err(err);
            }
        };

        let mut progress = LoadProgress::Pending {
            remaining: plan.levels().len(),
        };
        for level in levels {
            progress = self.store.submit_parsed(&ticket, level)?;
        }
        self.after_submit(progress);
        Ok(progress)
    }

    /// Host frame callback at time `now` (any monotonic origin).
    ///
    /// Steps the particles at most once per configured interval and refreshes
    /// the output buffers while visible.
    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        if !self.scheduler.should_step(now) {
            return TickOutcome::Skipped;
        }

        let field = self.store.current();
        let stats = self.particles.update(&field);
        if self.scheduler.is_visible() {
            self.rebuild_buffers();
        }

        debug!(
            "Wind tick advected={} respawned={} mean_speed={:.2}",
            stats.advected, stats.respawned, stats.mean_speed
        );
        TickOutcome::Stepped(stats)
    }

    /// [`WindEngine::tick`] using time since the engine was created
    pub fn tick_now(&mut self) -> TickOutcome {
        self.tick(self.epoch.elapsed())
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.scheduler.set_enabled(enabled);
    }

    /// Hide or show the layer. Showing refreshes the buffers at once.
    pub fn set_visible(&mut self, visible: bool) {
        let was_visible = self.scheduler.is_visible();
        self.scheduler.set_visible(visible);
        if visible && !was_visible {
            self.rebuild_buffers();
        }
    }

    pub fn set_view_mode(&mut self, view: ViewMode) {
        self.particles.set_view_mode(view);
    }

    pub fn is_enabled(&self) -> bool {
        self.scheduler.is_enabled()
    }

    pub fn is_visible(&self) -> bool {
        self.scheduler.is_visible()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.particles.view_mode()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot of the active field
    pub fn field(&self) -> Arc<WindField> {
        self.store.current()
    }

    pub fn store(&self) -> &WindFieldStore {
        &self.store
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// Trail segment endpoints, see [`TrailBufferBuilder`] for the layout
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Per-vertex RGB, parallel to [`WindEngine::vertices`]
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Length of the vertex (and colour) buffer; fixed for the engine's lifetime
    pub fn vertex_len(&self) -> usize {
        self.vertices.len()
    }

    pub fn frame_color(&self) -> Rgb {
        self.particles.frame_color()
    }

    /// Write the ROI wireframe (72 scalars) in the output projection
    pub fn roi_edges(&self, out: &mut [f32]) -> Result<()> {
        self.config.roi.edge_vertices(&self.config.projection, out)
    }

    pub fn roi(&self) -> &Roi {
        &self.config.roi
    }

    fn after_submit(&mut self, progress: LoadProgress) {
        if let LoadProgress::Installed { .. } = progress {
            self.on_field_installed();
        }
    }

    fn on_field_installed(&mut self) -> SeedOutcome {
        let field = self.store.current();
        let outcome = self.particles.reseed(&field);
        self.rebuild_buffers();
        outcome
    }

    fn rebuild_buffers(&mut self) {
        let particles = self.particles.particles();
        if let Err(err) =
            self.builder
                .write_positions(particles, &self.config.projection, &mut self.vertices)
        {
            warn!("Failed to write trail vertices: {}", err);
        }
        if let Err(err) =
            self.builder
                .write_colors(particles, self.particles.color_ramp(), &mut self.colors)
        {
            warn!("Failed to write trail colours: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::LevelAltitudes;
    use crate::grid::ComponentGrid;

    fn small_config() -> EngineConfig {
        let mut config = EngineConfig {
            seed: Some(11),
            ..EngineConfig::default()
        };
        config.particles.count = 20;
        config.particles.trail_capacity = 5;
        config
    }

    fn field(levels: &[LevelId]) -> WindField {
        let altitudes = LevelAltitudes::default();
        levels.iter().fold(WindField::new(), |field, &id| {
            field.with_level(
                WindLevel::new(
                    id,
                    vec![5.0, 38.5],
                    vec![66.0, 99.0],
                    ComponentGrid::filled(2, 2, 4.0),
                    ComponentGrid::filled(2, 2, 3.0),
                    altitudes.altitude(id),
                )
                .unwrap(),
            )
        })
    }

    #[test]
    fn test_buffers_sized_once() {
        let mut engine = WindEngine::with_field(small_config(), field(&[LevelId::Surface])).unwrap();
        let len = engine.vertex_len();
        assert_eq!(len, 20 * 4 * 6);
        assert_eq!(engine.colors().len(), len);

        for i in 0..20 {
            engine.tick(Duration::from_millis(i * 40));
        }
        assert_eq!(engine.vertices().len(), len);
    }

    #[test]
    fn test_tick_is_rate_limited() {
        let mut engine = WindEngine::with_field(small_config(), field(&[LevelId::Surface])).unwrap();
        assert!(matches!(engine.tick(Duration::ZERO), TickOutcome::Stepped(_)));
        assert_eq!(engine.tick(Duration::from_millis(10)), TickOutcome::Skipped);
        assert!(matches!(engine.tick(Duration::from_millis(40)), TickOutcome::Stepped(_)));

        engine.set_enabled(false);
        assert_eq!(engine.tick(Duration::from_millis(1000)), TickOutcome::Skipped);
    }

    #[test]
    fn test_hidden_engine_keeps_simulating() {
        let mut engine = WindEngine::with_field(small_config(), field(&[LevelId::Surface])).unwrap();
        let before = engine.vertices().to_vec();
        engine.set_visible(false);

        assert!(matches!(engine.tick(Duration::ZERO), TickOutcome::Stepped(_)));
        assert_eq!(engine.vertices(), before.as_slice());

        engine.set_visible(true);
        assert_ne!(engine.vertices(), before.as_slice());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = small_config();
        config.particles.trail_capacity = 0;
        assert!(WindEngine::new(config).is_err());
    }
}
