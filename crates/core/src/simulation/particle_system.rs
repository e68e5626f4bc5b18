//! Fixed-size particle pool advected through the wind field
//!
//! The pool is allocated once. Seeding, respawning and stepping all mutate
//! particles in place, so a steady-state update never allocates.
//!
//! Each accepted tick, every particle samples the field at its position:
//! - `Wind`: record its speed, take one Euler step, push the new position
//!   onto its trail
//! - `NoData`: respawn inside the spawn disk with a collapsed trail

use crate::config::{EngineConfig, ParticleConfig, SpawnConfig};
use crate::core_types::{ColorRamp, GeoPoint, LevelAltitudes, LevelId, Rgb, Roi};
use crate::error::Result;
use crate::grid::{sample, WindField, WindSample};
use crate::simulation::particle::Particle;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use tracing::{info, warn};

/// How the host camera is looking at the globe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Oblique view; vertical motion is shown when the data carries `w`
    #[default]
    Perspective,
    /// Looking straight down; heights stay pinned to their level
    TopDown,
}

/// Whether the system has a field to work against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    /// No levels were available at the last seeding
    Idle,
    Active,
}

/// Result of [`ParticleSystem::reseed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { particles: usize, levels: usize },
    /// The field had no levels; particles were left untouched
    Idle,
}

/// Per-update counters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UpdateStats {
    /// Particles that sampled wind and moved
    pub advected: usize,
    /// Particles that hit NoData and were respawned
    pub respawned: usize,
    /// Mean horizontal speed over advected particles (0 if none)
    pub mean_speed: f32,
}

/// Pool of particles plus the parameters that drive them
#[derive(Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    params: ParticleConfig,
    spawn: SpawnConfig,
    roi: Roi,
    altitudes: LevelAltitudes,
    ramp: ColorRamp,
    rng: StdRng,
    state: SystemState,
    view: ViewMode,
    /// Mean speed of the last update that advected anything
    frame_speed: f32,
}

impl ParticleSystem {
    /// Allocate the pool. Particles start collapsed at the spawn centre in
    /// the `Idle` state until the first [`ParticleSystem::reseed`].
    ///
    /// The configuration is validated first; a trail shorter than two points
    /// is rejected here.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let roi = config.roi;
        let (lat, lon) = roi.clamp_lat_lon(config.spawn.center_lat, config.spawn.center_lon);
        let start = GeoPoint::new(lat, lon, config.altitudes.altitude(LevelId::Surface));

        let particles = (0..config.particles.count)
            .map(|_| Particle::new(LevelId::Surface, start, config.particles.trail_capacity))
            .collect();

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            particles,
            params: config.particles,
            spawn: config.spawn,
            roi,
            altitudes: config.altitudes,
            ramp: config.color,
            rng,
            state: SystemState::Idle,
            view: ViewMode::default(),
            frame_speed: 0.0,
        })
    }

    /// Redistribute every particle over the spawn disk against `field`.
    ///
    /// Each particle draws a level uniformly from the levels present. With an
    /// empty field the system goes `Idle` and waits for the next reseed.
    pub fn reseed(&mut self, field: &WindField) -> SeedOutcome {
        let level_count = field.len();
        if level_count == 0 {
            warn!("No wind levels available, particle system idle");
            self.state = SystemState::Idle;
            return SeedOutcome::Idle;
        }

        let Self {
            particles,
            spawn,
            roi,
            altitudes,
            rng,
            ..
        } = self;

        for particle in particles.iter_mut() {
            let level = random_level(rng, field).unwrap_or(particle.level);
            let position = spawn_point(rng, spawn, roi, altitudes.altitude(level));
            particle.place(level, position);
        }

        self.state = SystemState::Active;
        self.frame_speed = 0.0;

        info!(
            "Seeded {} particles over {} wind levels",
            self.particles.len(),
            level_count
        );

        SeedOutcome::Seeded {
            particles: self.particles.len(),
            levels: level_count,
        }
    }

    /// Advance every particle by one step through `field`.
    ///
    /// Does nothing while `Idle`. An empty field puts the system back to `Idle`.
    pub fn update(&mut self, field: &WindField) -> UpdateStats {
        if field.is_empty() {
            if self.state == SystemState::Active {
                warn!("Wind field emptied, particle system idle");
            }
            self.state = SystemState::Idle;
            return UpdateStats::default();
        }
        if self.state == SystemState::Idle {
            return UpdateStats::default();
        }

        let Self {
            particles,
            params,
            spawn,
            roi,
            altitudes,
            rng,
            view,
            ..
        } = self;

        let step = params.dt * params.horizontal_scale;
        let lift = params.dt * params.vertical_scale;

        let mut stats = UpdateStats::default();
        let mut speed_sum = 0.0f32;

        for particle in particles.iter_mut() {
            let GeoPoint { lat, lon, height } = particle.position;

            match sample(field, roi, lat, lon, height) {
                WindSample::NoData(_) => {
                    let level = if field.contains(particle.level) {
                        particle.level
                    } else {
                        random_level(rng, field).unwrap_or(particle.level)
                    };
                    let position = spawn_point(rng, spawn, roi, altitudes.altitude(level));
                    particle.place(level, position);
                    stats.respawned += 1;
                }
                WindSample::Wind(wind) => {
                    let speed = wind.horizontal_speed();
                    particle.speed = speed;
                    speed_sum += speed;
                    stats.advected += 1;

                    let height = match (*view, wind.w) {
                        (ViewMode::Perspective, Some(w)) => roi.clamp_height(height + w * lift),
                        _ => altitudes.altitude(particle.level),
                    };

                    particle.position = GeoPoint::new(lat + wind.v * step, lon + wind.u * step, height);
                    particle.trail.push(particle.position);
                }
            }
        }

        if stats.advected > 0 {
            stats.mean_speed = speed_sum / stats.advected as f32;
            self.frame_speed = stats.mean_speed;
        }
        stats
    }

    pub fn set_view_mode(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn trail_capacity(&self) -> usize {
        self.params.trail_capacity
    }

    pub fn color_ramp(&self) -> &ColorRamp {
        &self.ramp
    }

    /// Colour of one particle from its last sampled speed
    pub fn particle_color(&self, index: usize) -> Option<Rgb> {
        self.particles
            .get(index)
            .map(|particle| self.ramp.color_for_speed(particle.speed))
    }

    /// Single colour for the whole layer, from the mean speed of the most
    /// recent update that moved any particle
    pub fn frame_color(&self) -> Rgb {
        self.ramp.color_for_speed(self.frame_speed)
    }
}

/// Uniformly chosen level among those present in `field`
fn random_level(rng: &mut StdRng, field: &WindField) -> Option<LevelId> {
    let count = field.len();
    if count == 0 {
        return None;
    }
    field.level_ids().nth(rng.random_range(0..count))
}

/// Area-uniform point in the spawn disk, clamped into the ROI
fn spawn_point(rng: &mut StdRng, spawn: &SpawnConfig, roi: &Roi, height: f32) -> GeoPoint {
    let angle = rng.random::<f32>() * TAU;
    let radius = rng.random::<f32>().sqrt() * spawn.radius_deg;

    let (lat, lon) = roi.clamp_lat_lon(
        spawn.center_lat + radius * angle.cos(),
        spawn.center_lon + radius * angle.sin(),
    );
    GeoPoint::new(lat, lon, height)
}
