use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Runtime configuration. Loaded read-only; OMOS never writes settings back.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppSettings {
    pub speech_enabled: bool,
    /// Speaking rate in words per minute.
    pub speech_rate_wpm: u32,
    pub speech_queue_capacity: usize,
    pub music_enabled: bool,
    pub music_track: PathBuf,
    /// Background music volume, 0.0 to 1.0.
    pub music_volume: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            speech_enabled: true,
            speech_rate_wpm: 190,
            speech_queue_capacity: 10,
            music_enabled: true,
            music_track: PathBuf::from("assets/audio/bg_music.mp3"),
            music_volume: 0.35,
        }
    }
}

impl AppSettings {
    /// Reads settings from the JSON file named by `OMOS_CONFIG`, falling
    /// back to defaults when the variable is unset or the file is bad.
    pub fn load() -> Self {
        let Ok(path) = env::var("OMOS_CONFIG") else {
            debug!("OMOS_CONFIG not set; using default settings");
            return Self::default();
        };
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("could not read settings at {}: {}; using defaults", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("could not parse settings at {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert!(settings.speech_enabled);
        assert_eq!(settings.speech_rate_wpm, 190);
        assert_eq!(settings.speech_queue_capacity, 10);
        assert!((settings.music_volume - 0.35).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"music_enabled": false, "speech_rate_wpm": 150}}"#).unwrap();

        let settings = AppSettings::load_from(file.path());
        assert!(!settings.music_enabled);
        assert_eq!(settings.speech_rate_wpm, 150);
        // Untouched fields keep their defaults.
        assert!(settings.speech_enabled);
        assert_eq!(settings.speech_queue_capacity, 10);
    }

    #[test]
    fn test_unreadable_file_falls_back_to_defaults() {
        let settings = AppSettings::load_from(Path::new("/nonexistent/omos.json"));
        assert!(settings.speech_enabled);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let settings = AppSettings::load_from(file.path());
        assert_eq!(settings.speech_queue_capacity, 10);
    }
}
