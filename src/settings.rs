//! Player preferences
//!
//! Persisted in LocalStorage, separate from gameplay tuning.

use serde::{Deserialize, Serialize};

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub sound_enabled: bool,
    pub music_enabled: bool,

    // === Behaviour ===
    /// Pause automatically when the page is hidden or loses focus
    pub pause_on_blur: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            sfx_volume: 1.0,
            music_volume: 0.5,
            sound_enabled: true,
            music_enabled: true,
            pause_on_blur: true,
            show_fps: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "dino_runner_settings";

    /// Both channels off
    pub fn is_muted(&self) -> bool {
        !self.sound_enabled && !self.music_enabled
    }

    /// Mute key: flips sound and music together. Returns the new muted state.
    pub fn toggle_mute(&mut self) -> bool {
        let enable = self.is_muted();
        self.sound_enabled = enable;
        self.music_enabled = enable;
        !enable
    }

    /// Volume applied to sound effects (0 when disabled)
    pub fn effective_sfx_volume(&self) -> f32 {
        self.audio_levels().sfx_gain().unwrap_or(0.0)
    }

    /// Volume applied to music (0 when disabled)
    pub fn effective_music_volume(&self) -> f32 {
        self.audio_levels().music_gain().unwrap_or(0.0)
    }

    /// Mixed volumes and channel switches for the audio backend
    pub fn audio_levels(&self) -> AudioLevels {
        AudioLevels {
            sfx_volume: (self.master_volume * self.sfx_volume).clamp(0.0, 1.0),
            music_volume: (self.master_volume * self.music_volume).clamp(0.0, 1.0),
            sound_enabled: self.sound_enabled,
            music_enabled: self.music_enabled,
        }
    }

    /// Parse a stored document, clamping volumes into range
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<Settings>(json) {
            Ok(mut settings) => {
                settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
                settings.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
                settings.music_volume = settings.music_volume.clamp(0.0, 1.0);
                Some(settings)
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                None
            }
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
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
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No storage for {} on native", Self::STORAGE_KEY);
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Channel volumes as the audio backend sees them.
///
/// Volumes are stored unswitched; the enable flags are only consulted when a
/// sound is about to play, so unmuting restores the configured levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioLevels {
    sfx_volume: f32,
    music_volume: f32,
    sound_enabled: bool,
    music_enabled: bool,
}

impl AudioLevels {
    pub fn is_muted(&self) -> bool {
        !self.sound_enabled && !self.music_enabled
    }

    /// Mute or unmute both channels together
    pub fn set_muted(&mut self, muted: bool) {
        self.sound_enabled = !muted;
        self.music_enabled = !muted;
    }

    /// Gain for a sound effect, `None` when effects are silent
    pub fn sfx_gain(&self) -> Option<f32> {
        (self.sound_enabled && self.sfx_volume > 0.0).then_some(self.sfx_volume)
    }

    /// Gain for music, `None` when music is silent
    pub fn music_gain(&self) -> Option<f32> {
        (self.music_enabled && self.music_volume > 0.0).then_some(self.music_volume)
    }
}
