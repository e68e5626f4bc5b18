//! Rate gate between host frames and simulation steps
//!
//! Hosts call in every frame; the scheduler accepts at most one step per
//! `min_interval` of host time, so particle speed on screen does not depend
//! on the host frame rate.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateScheduler {
    min_interval: Duration,
    last_step: Option<Duration>,
    enabled: bool,
    visible: bool,
}

impl UpdateScheduler {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_step: None,
            enabled: true,
            visible: true,
        }
    }

    /// Decide whether a tick at host time `now` may step the simulation.
    ///
    /// The first tick always steps. A clock that jumps backwards resets the
    /// reference point and steps.
    pub fn should_step(&mut self, now: Duration) -> bool {
        if !self.enabled {
            return false;
        }

        let due = match self.last_step {
            Some(last) if now >= last => now - last >= self.min_interval,
            // first tick, or the host clock went backwards
            _ => true,
        };
        if due {
            self.last_step = Some(now);
        }
        due
    }

    /// Start or stop stepping. Re-enabling steps on the next tick.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.last_step = None;
        }
        self.enabled = enabled;
    }

    /// Show or hide the layer; does not affect stepping
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(33))
    }
}
