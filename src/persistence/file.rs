//! JSON file store for the native runner

use std::fs;
use std::path::{Path, PathBuf};

use super::{PersistError, Stats, StatsStore};

/// Stats in a JSON file. A missing file reads as zeros.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsStore for JsonFileStore {
    fn load(&self) -> Result<Stats, PersistError> {
        if !self.path.exists() {
            log::info!("No stats at {}, starting fresh", self.path.display());
            return Ok(Stats::default());
        }
        let json = fs::read_to_string(&self.path)?;
        let stats = serde_json::from_str(&json)?;
        log::info!("Loaded stats from {}", self.path.display());
        Ok(stats)
    }

    fn save(&mut self, stats: &Stats) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Write then rename so a crash never leaves a torn record
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(stats)?)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("Stats saved to {}", self.path.display());
        Ok(())
    }
}
