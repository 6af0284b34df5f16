//! Player preferences
//!
//! Persisted separately from stats in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::tuning::Platform;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Visual Effects ===
    /// Particle bursts
    pub particles: bool,

    // === Accessibility ===
    /// Reduced motion (no particles, no banner flashing)
    pub reduced_motion: bool,

    /// Tuning preset; `None` picks from the viewport
    pub platform: Option<Platform>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            particles: true,
            reduced_motion: false,
            platform: None,
        }
    }
}

impl Settings {
    /// Particles drawn at all (respects reduced_motion)
    pub fn effective_particles(&self) -> bool {
        self.particles && !self.reduced_motion
    }

    /// Volume after mute
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Configured platform, or a guess from the viewport width
    pub fn platform_for_width(&self, viewport_width: f64) -> Platform {
        self.platform.unwrap_or(if viewport_width < 600.0 {
            Platform::Mobile
        } else {
            Platform::Desktop
        })
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "flappy_rogue_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to save settings");
                    return;
                }
                log::info!("Settings saved");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_disables_particles() {
        let mut settings = Settings::default();
        assert!(settings.effective_particles());
        settings.reduced_motion = true;
        assert!(!settings.effective_particles());
    }

    #[test]
    fn test_mute() {
        let mut settings = Settings::default();
        assert!((settings.effective_volume() - 0.8).abs() < 1e-6);
        settings.muted = true;
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_effective_volume_scales() {
        let settings = Settings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            ..Default::default()
        };
        assert!((settings.effective_volume() - 0.25).abs() < 1e-6);

        let loud = Settings {
            master_volume: 2.0,
            ..Default::default()
        };
        assert_eq!(loud.effective_volume(), 1.0);
    }

    #[test]
    fn test_platform_guess() {
        let mut settings = Settings::default();
        assert_eq!(settings.platform_for_width(375.0), Platform::Mobile);
        assert_eq!(settings.platform_for_width(1280.0), Platform::Desktop);
        settings.platform = Some(Platform::Desktop);
        assert_eq!(settings.platform_for_width(375.0), Platform::Desktop);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"muted": true}"#).unwrap();
        assert!(settings.muted);
        assert!(settings.particles);
        assert_eq!(settings.platform, None);
    }
}
