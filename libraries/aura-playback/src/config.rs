/// Playback service configuration
use crate::error::{PlaybackError, Result};
use crate::session::FallbackText;
use crate::types::MAX_BASS_STRENGTH;
use aura_core::FolderFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Position poll interval while playing
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// "Previous" restarts the current track past this position
    #[serde(default = "default_restart_threshold_ms")]
    pub restart_threshold_ms: u64,

    /// Fixed shuffle seed; random when unset
    #[serde(default)]
    pub shuffle_seed: Option<u64>,

    #[serde(default = "default_library")]
    pub library: LibrarySettings,

    #[serde(default = "default_effects")]
    pub effects: EffectsSettings,

    #[serde(default = "default_notification")]
    pub notification: NotificationSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarySettings {
    #[serde(default = "default_folder_filter")]
    pub folder_filter: String,

    #[serde(default = "default_top_songs")]
    pub top_songs: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EffectsSettings {
    /// Bass strength used when nothing was persisted yet
    #[serde(default)]
    pub default_bass_strength: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationSettings {
    #[serde(default = "default_fallback_title")]
    pub fallback_title: String,

    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,
}

impl ServiceConfig {
    /// Load configuration from an optional TOML file and `AURA__`-prefixed
    /// environment variables (e.g. `AURA__LIBRARY__TOP_SONGS=10`)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path.filter(|p| p.exists()) {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("AURA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(PlaybackError::Config(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.effects.default_bass_strength > MAX_BASS_STRENGTH {
            return Err(PlaybackError::Config(format!(
                "effects.default_bass_strength must be 0-{}, got {}",
                MAX_BASS_STRENGTH, self.effects.default_bass_strength
            )));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn folder_filter(&self) -> FolderFilter {
        FolderFilter::new(&self.library.folder_filter)
    }

    pub fn fallback_text(&self) -> FallbackText {
        FallbackText {
            title: self.notification.fallback_title.clone(),
            text: self.notification.fallback_text.clone(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            restart_threshold_ms: default_restart_threshold_ms(),
            shuffle_seed: None,
            library: default_library(),
            effects: default_effects(),
            notification: default_notification(),
        }
    }
}

// Default values
fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_restart_threshold_ms() -> u64 {
    3000
}

fn default_library() -> LibrarySettings {
    LibrarySettings {
        folder_filter: default_folder_filter(),
        top_songs: default_top_songs(),
    }
}

fn default_folder_filter() -> String {
    "AURA_Music/".to_string()
}

fn default_top_songs() -> usize {
    5
}

fn default_effects() -> EffectsSettings {
    EffectsSettings {
        default_bass_strength: 0,
    }
}

fn default_notification() -> NotificationSettings {
    let fallback = FallbackText::default();
    NotificationSettings {
        fallback_title: fallback.title,
        fallback_text: fallback.text,
    }
}

fn default_fallback_title() -> String {
    FallbackText::default().title
}

fn default_fallback_text() -> String {
    FallbackText::default().text
}
