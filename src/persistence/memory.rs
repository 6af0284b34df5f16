//! In-memory stats store

use super::{PersistError, Stats, StatsStore};

/// In-memory store for headless runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    stats: Stats,
    saves: usize,
    failing: bool,
}

impl MemoryStore {
    /// A store whose every operation fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    /// Successful saves so far
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl StatsStore for MemoryStore {
    fn load(&self) -> Result<Stats, PersistError> {
        if self.failing {
            return Err(PersistError::Unavailable);
        }
        Ok(self.stats.clone())
    }

    fn save(&mut self, stats: &Stats) -> Result<(), PersistError> {
        if self.failing {
            return Err(PersistError::Unavailable);
        }
        self.stats = stats.clone();
        self.saves += 1;
        Ok(())
    }
}
