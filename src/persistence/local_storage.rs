//! Browser LocalStorage store

use super::{PersistError, Stats, StatsStore};

/// Stats under a single LocalStorage key
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new("flappy_rogue_stats")
    }
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage, PersistError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(PersistError::Unavailable)
    }
}

impl StatsStore for LocalStorageStore {
    fn load(&self) -> Result<Stats, PersistError> {
        let storage = Self::storage()?;
        match storage.get_item(&self.key) {
            Ok(Some(json)) => {
                let stats = serde_json::from_str(&json)?;
                log::info!("Loaded stats from LocalStorage");
                Ok(stats)
            }
            Ok(None) => {
                log::info!("No stats found, starting fresh");
                Ok(Stats::default())
            }
            Err(e) => Err(PersistError::Backend(format!("{:?}", e))),
        }
    }

    fn save(&mut self, stats: &Stats) -> Result<(), PersistError> {
        let storage = Self::storage()?;
        let json = serde_json::to_string(stats)?;
        storage
            .set_item(&self.key, &json)
            .map_err(|e| PersistError::Backend(format!("{:?}", e)))?;
        log::debug!("Stats saved ({} runs)", stats.total_runs);
        Ok(())
    }
}
