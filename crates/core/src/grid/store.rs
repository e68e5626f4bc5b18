//! Versioned holder of the active wind field
//!
//! Loads are asynchronous from the engine's point of view: a caller opens a
//! load with [`WindFieldStore::begin_load`], fetches the requested levels in
//! any order (possibly concurrently) and submits each payload. Once every
//! requested level has arrived the new field is installed in one swap.
//!
//! Every load and every direct install takes the next generation number. A
//! completed load only replaces the field if its generation is newer than the
//! installed one, so a slow response for an old time step can never overwrite
//! a newer selection.

use crate::core_types::{LevelAltitudes, LevelId};
use crate::error::{Result, WindError};
use crate::grid::{WindField, WindLevel};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Loads kept open at once; opening another evicts the oldest
pub const MAX_PENDING_LOADS: usize = 4;

/// Which levels a load requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadPlan {
    /// The field becomes exactly this one level
    SingleLevel(LevelId),
    /// Every level (3D mode)
    AllLevels,
}

impl LoadPlan {
    /// Levels this plan must receive before the field can be installed
    pub fn levels(&self) -> &[LevelId] {
        match self {
            LoadPlan::SingleLevel(level) => std::slice::from_ref(level),
            LoadPlan::AllLevels => &LevelId::ALL,
        }
    }
}

/// Handle for one in-flight load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub plan: LoadPlan,
    pub time_step: String,
}

/// State of a load after a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadProgress {
    /// Still waiting for `remaining` levels
    Pending { remaining: usize },
    /// The load completed and is now the active field
    Installed { generation: u64 },
    /// The load was superseded by `installed` and its data dropped
    Discarded { generation: u64, installed: u64 },
}

#[derive(Debug)]
struct PendingLoad {
    plan: LoadPlan,
    field: WindField,
}

impl PendingLoad {
    fn remaining(&self) -> usize {
        self.plan
            .levels()
            .iter()
            .filter(|level| !self.field.contains(**level))
            .count()
    }
}

/// Owner of the active [`WindField`] and of all pending loads
#[derive(Debug)]
pub struct WindFieldStore {
    current: Arc<WindField>,
    installed_generation: u64,
    next_generation: u64,
    pending: FxHashMap<u64, PendingLoad>,
    altitudes: LevelAltitudes,
}

impl WindFieldStore {
    /// Empty store; `altitudes` supplies the altitude of every loaded level
    pub fn new(altitudes: LevelAltitudes) -> Self {
        Self {
            current: Arc::new(WindField::default()),
            installed_generation: 0,
            next_generation: 1,
            pending: FxHashMap::default(),
            altitudes,
        }
    }

    /// Snapshot of the active field. Never partially updated.
    pub fn current(&self) -> Arc<WindField> {
        Arc::clone(&self.current)
    }

    /// Borrow the active field without bumping the refcount
    pub fn field(&self) -> &WindField {
        &self.current
    }

    /// Generation of the active field (0 before anything was installed)
    pub fn generation(&self) -> u64 {
        self.installed_generation
    }

    pub fn altitudes(&self) -> &LevelAltitudes {
        &self.altitudes
    }

    /// Number of loads still waiting for levels
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Open a new load for `time_step`.
    ///
    /// At most [`MAX_PENDING_LOADS`] loads stay open. A load whose fetch died
    /// without being abandoned is evicted once newer loads push it out, and a
    /// late submission for it reports `Discarded`.
    pub fn begin_load(&mut self, plan: LoadPlan, time_step: impl Into<String>) -> LoadTicket {
        let generation = self.take_generation();
        let time_step = time_step.into();

        while self.pending.len() >= MAX_PENDING_LOADS {
            let Some(&oldest) = self.pending.keys().min() else {
                break;
            };
            warn!("Evicting unfinished wind load gen={}", oldest);
            self.pending.remove(&oldest);
        }

        debug!(
            "Begin wind load gen={} plan={:?} time_step={}",
            generation, plan, time_step
        );

        self.pending.insert(
            generation,
            PendingLoad {
                plan,
                field: WindField::for_time_step(time_step.clone()),
            },
        );

        LoadTicket {
            generation,
            plan,
            time_step,
        }
    }

    /// Submit one level's JSON payload for a ticket
    pub fn submit_level(
        &mut self,
        ticket: &LoadTicket,
        level: LevelId,
        json: &str,
    ) -> Result<LoadProgress> {
        self.submit_generation(ticket.generation, level, json)
    }

    /// Submit one level's JSON payload by generation number.
    ///
    /// A malformed payload fails the whole load: the pending entry is dropped
    /// and the schema error is returned.
    pub fn submit_generation(
        &mut self,
        generation: u64,
        level: LevelId,
        json: &str,
    ) -> Result<LoadProgress> {
        if let Some(progress) = self.check_pending(generation, level)? {
            return Ok(progress);
        }

        match WindLevel::from_json(level, json, self.altitudes.altitude(level)) {
            Ok(parsed) => self.accept(generation, parsed),
            Err(err) => {
                warn!("Dropping wind load gen={}: {}", generation, err);
                self.pending.remove(&generation);
                Err(err)
            }
        }
    }

    /// Submit an already-validated level for a ticket
    pub fn submit_parsed(&mut self, ticket: &LoadTicket, level: WindLevel) -> Result<LoadProgress> {
        if let Some(progress) = self.check_pending(ticket.generation, level.id())? {
            return Ok(progress);
        }
        self.accept(ticket.generation, level)
    }

    /// Cancel a pending load. Returns false if it was not pending.
    pub fn abandon(&mut self, generation: u64) -> bool {
        let removed = self.pending.remove(&generation).is_some();
        if removed {
            debug!("Abandoned wind load gen={}", generation);
        }
        removed
    }

    /// Replace the active field immediately.
    ///
    /// Takes a fresh generation, so every load still in flight becomes stale.
    pub fn install(&mut self, field: WindField) -> u64 {
        let generation = self.take_generation();
        self.pending.clear();
        self.swap_in(generation, field);
        generation
    }

    fn take_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    /// `Ok(Some(_))` short-circuits a submission for a load that is already gone
    fn check_pending(&self, generation: u64, level: LevelId) -> Result<Option<LoadProgress>> {
        if generation == 0 || generation >= self.next_generation {
            return Err(WindError::UnknownGeneration(generation));
        }

        let Some(pending) = self.pending.get(&generation) else {
            return Ok(Some(LoadProgress::Discarded {
                generation,
                installed: self.installed_generation,
            }));
        };

        if !pending.plan.levels().contains(&level) {
            return Err(WindError::UnexpectedLevel { level, generation });
        }
        Ok(None)
    }

    fn accept(&mut self, generation: u64, level: WindLevel) -> Result<LoadProgress> {
        let Some(pending) = self.pending.get_mut(&generation) else {
            return Err(WindError::UnknownGeneration(generation));
        };

        pending.field.insert(level);
        let remaining = pending.remaining();
        if remaining > 0 {
            return Ok(LoadProgress::Pending { remaining });
        }

        let Some(complete) = self.pending.remove(&generation) else {
            return Err(WindError::UnknownGeneration(generation));
        };

        if generation <= self.installed_generation {
            warn!(
                "Discarding stale wind load gen={} (installed gen={})",
                generation, self.installed_generation
            );
            return Ok(LoadProgress::Discarded {
                generation,
                installed: self.installed_generation,
            });
        }

        // Anything older can no longer win
        self.pending.retain(|&other, _| other > generation);
        self.swap_in(generation, complete.field);
        Ok(LoadProgress::Installed { generation })
    }

    fn swap_in(&mut self, generation: u64, field: WindField) {
        info!(
            "Installed wind field gen={} levels={:?} time_step={:?}",
            generation,
            field.level_ids().collect::<Vec<_>>(),
            field.time_step()
        );
        self.current = Arc::new(field);
        self.installed_generation = generation;
    }
}

impl Default for WindFieldStore {
    fn default() -> Self {
        Self::new(LevelAltitudes::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"lat": [5.0, 38.5], "lon": [66.0, 99.0],
        "u": [[1.0, 1.0], [1.0, 1.0]], "v": [[0.0, 0.0], [0.0, 0.0]]}"#;

    #[test]
    fn test_single_level_load_installs_after_one_submit() {
        let mut store = WindFieldStore::default();
        let ticket = store.begin_load(LoadPlan::SingleLevel(LevelId::Hpa700), "2024-06-01T00");

        let progress = store.submit_level(&ticket, LevelId::Hpa700, PAYLOAD).unwrap();
        assert_eq!(progress, LoadProgress::Installed { generation: ticket.generation });

        let field = store.current();
        assert_eq!(field.level_ids().collect::<Vec<_>>(), vec![LevelId::Hpa700]);
        assert_eq!(field.time_step(), Some("2024-06-01T00"));
        // Level altitude comes from the store's table
        assert_eq!(
            field.get(LevelId::Hpa700).unwrap().altitude_m(),
            LevelAltitudes::default().hpa700
        );
    }

    #[test]
    fn test_all_levels_waits_for_every_level() {
        let mut store = WindFieldStore::default();
        let ticket = store.begin_load(LoadPlan::AllLevels, "t0");

        for (i, level) in [LevelId::Hpa500, LevelId::Surface, LevelId::Hpa850].into_iter().enumerate() {
            let progress = store.submit_level(&ticket, level, PAYLOAD).unwrap();
            assert_eq!(progress, LoadProgress::Pending { remaining: 3 - i });
            assert!(store.field().is_empty());
        }

        let progress = store.submit_level(&ticket, LevelId::Hpa700, PAYLOAD).unwrap();
        assert!(matches!(progress, LoadProgress::Installed { .. }));
        assert_eq!(store.field().len(), 4);
    }

    #[test]
    fn test_older_load_cannot_overwrite_newer() {
        let mut store = WindFieldStore::default();
        let old = store.begin_load(LoadPlan::SingleLevel(LevelId::Surface), "old");
        let new = store.begin_load(LoadPlan::SingleLevel(LevelId::Hpa850), "new");

        store.submit_level(&new, LevelId::Hpa850, PAYLOAD).unwrap();
        assert_eq!(store.generation(), new.generation);

        let late = store.submit_level(&old, LevelId::Surface, PAYLOAD).unwrap();
        assert_eq!(
            late,
            LoadProgress::Discarded { generation: old.generation, installed: new.generation }
        );
        assert_eq!(store.field().time_step(), Some("new"));
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn test_direct_install_makes_pending_loads_stale() {
        let mut store = WindFieldStore::default();
        let ticket = store.begin_load(LoadPlan::SingleLevel(LevelId::Surface), "t");
        let generation = store.install(WindField::for_time_step("manual"));
        assert!(generation > ticket.generation);

        let progress = store.submit_level(&ticket, LevelId::Surface, PAYLOAD).unwrap();
        assert!(matches!(progress, LoadProgress::Discarded { .. }));
        assert_eq!(store.field().time_step(), Some("manual"));
    }

    #[test]
    fn test_schema_error_drops_load() {
        let mut store = WindFieldStore::default();
        let ticket = store.begin_load(LoadPlan::AllLevels, "t");

        let err = store
            .submit_level(&ticket, LevelId::Surface, r#"{"lat": [1.0]}"#)
            .unwrap_err();
        assert!(matches!(err, WindError::Schema { level: LevelId::Surface, .. }));
        assert_eq!(store.pending_count(), 0);
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_rejects_unrequested_level_and_unknown_generation() {
        let mut store = WindFieldStore::default();
        let ticket = store.begin_load(LoadPlan::SingleLevel(LevelId::Surface), "t");

        assert!(matches!(
            store.submit_level(&ticket, LevelId::Hpa500, PAYLOAD),
            Err(WindError::UnexpectedLevel { level: LevelId::Hpa500, .. })
        ));
        assert!(matches!(
            store.submit_generation(99, LevelId::Surface, PAYLOAD),
            Err(WindError::UnknownGeneration(99))
        ));

        assert!(store.abandon(ticket.generation));
        assert!(!store.abandon(ticket.generation));
    }

    #[test]
    fn test_unfinished_loads_are_capped() {
        let mut store = WindFieldStore::default();
        let forgotten = store.begin_load(LoadPlan::AllLevels, "dead fetch");
        let tickets: Vec<LoadTicket> = (0..MAX_PENDING_LOADS)
            .map(|step| store.begin_load(LoadPlan::SingleLevel(LevelId::Surface), format!("t{step}")))
            .collect();
        assert_eq!(store.pending_count(), MAX_PENDING_LOADS);
        let latest = &tickets[MAX_PENDING_LOADS - 1];

        let late = store.submit_level(&forgotten, LevelId::Surface, PAYLOAD).unwrap();
        assert!(matches!(late, LoadProgress::Discarded { .. }));

        let progress = store.submit_level(latest, LevelId::Surface, PAYLOAD).unwrap();
        assert_eq!(progress, LoadProgress::Installed { generation: latest.generation });
        assert_eq!(store.pending_count(), 0);
    }
}
