//! Lifetime stats persistence
//!
//! Stores hold a single [`Stats`] record. Failures never end a run: a failed
//! load falls back to zeros and a failed save is logged and dropped.

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;

#[cfg(target_arch = "wasm32")]
mod local_storage;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a stats backend
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage unavailable")]
    Unavailable,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed stats record: {0}")]
    Format(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Lifetime stats across runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub high_score: u64,
    pub total_runs: u64,
}

impl Stats {
    /// Raise the high score if beaten. Returns true on a new record.
    pub fn record_score(&mut self, score: u64) -> bool {
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }
}

/// A place to keep [`Stats`]
pub trait StatsStore {
    fn load(&self) -> Result<Stats, PersistError>;
    fn save(&mut self, stats: &Stats) -> Result<(), PersistError>;
}

/// Load, falling back to zeros on any failure
pub fn load_or_default(store: &dyn StatsStore) -> Stats {
    match store.load() {
        Ok(stats) => stats,
        Err(e) => {
            log::warn!("Failed to load stats, starting fresh: {}", e);
            Stats::default()
        }
    }
}

/// Save, logging instead of failing
pub fn save_or_warn(store: &mut dyn StatsStore, stats: &Stats) {
    if let Err(e) = store.save(stats) {
        log::warn!("Failed to save stats: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_score_is_monotonic() {
        let mut stats = Stats::default();
        assert!(stats.record_score(10));
        assert!(!stats.record_score(4));
        assert!(!stats.record_score(10));
        assert_eq!(stats.high_score, 10);
    }

    #[test]
    fn test_failed_load_yields_zeros() {
        let store = MemoryStore::failing();
        assert_eq!(load_or_default(&store), Stats::default());
    }

    #[test]
    fn test_failed_save_is_swallowed() {
        let mut store = MemoryStore::failing();
        let stats = Stats {
            high_score: 3,
            total_runs: 1,
        };
        save_or_warn(&mut store, &stats);
        assert_eq!(store.saves(), 0);
    }

    #[test]
    fn test_missing_fields_default() {
        let stats: Stats = serde_json::from_str(r#"{"high_score": 42}"#).unwrap();
        assert_eq!(stats.high_score, 42);
        assert_eq!(stats.total_runs, 0);
    }
}
