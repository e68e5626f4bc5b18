//! Sources of per-level wind payloads

use crate::core_types::LevelId;
use crate::error::{Result, WindError};
use std::path::{Path, PathBuf};

/// Delivers the raw JSON payload for one level at one time step.
///
/// Implementations must be shareable across threads: the engine fetches the
/// levels of a multi-level load concurrently.
pub trait FieldProvider: Send + Sync {
    fn fetch(&self, level: LevelId, time_step: &str) -> Result<String>;
}

impl<F> FieldProvider for F
where
    F: Fn(LevelId, &str) -> Result<String> + Send + Sync,
{
    fn fetch(&self, level: LevelId, time_step: &str) -> Result<String> {
        self(level, time_step)
    }
}

/// Reads payloads from a directory.
///
/// Looks for `{level}_{time_step}.json` first, then falls back to
/// `{level}.json` for time-independent data sets.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path that would be read for `level` at `time_step`, if any exists
    pub fn resolve(&self, level: LevelId, time_step: &str) -> Option<PathBuf> {
        let timed = self.root.join(format!("{level}_{time_step}.json"));
        if timed.is_file() {
            return Some(timed);
        }
        let plain = self.root.join(format!("{level}.json"));
        plain.is_file().then_some(plain)
    }
}

impl FieldProvider for DirectoryProvider {
    fn fetch(&self, level: LevelId, time_step: &str) -> Result<String> {
        let path = self.resolve(level, time_step).ok_or_else(|| WindError::Provider {
            level,
            message: format!(
                "no {level}_{time_step}.json or {level}.json in {}",
                self.root.display()
            ),
        })?;
        std::fs::read_to_string(&path).map_err(|e| WindError::Provider {
            level,
            message: format!("{}: {e}", path.display()),
        })
    }
}
