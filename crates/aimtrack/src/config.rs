//! JSON configuration for the tracker.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::events::DeviceId;
use crate::history::DEFAULT_HISTORY_CAPACITY;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_distance_offset() -> f32 {
    1.0
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

/// Tracker settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Devices whose tracking drives the head position instead of an aim point.
    #[serde(default)]
    pub helmet_ids: Vec<DeviceId>,
    /// Resting distance of the hub camera from the screen, in world units.
    #[serde(default = "default_distance_offset")]
    pub distance_offset: f32,
    /// Tracking samples kept per device for shot lookup.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            helmet_ids: Vec::new(),
            distance_offset: default_distance_offset(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl TrackerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn is_helmet(&self, device: &DeviceId) -> bool {
        self.helmet_ids.contains(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg = TrackerConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, TrackerConfig::default());
        assert_eq!(cfg.distance_offset, 1.0);
        assert_eq!(cfg.history_capacity, 100);
        assert!(cfg.helmet_ids.is_empty());
    }

    #[test]
    fn helmet_ids_parse_from_hex() {
        let cfg = TrackerConfig::from_json_str(
            r#"{ "helmet_ids": ["a1b2c3d4e5f6"], "distance_offset": 2.5 }"#,
        )
        .unwrap();
        let helmet = DeviceId([0xa1, 0xb2, 0xc3, 0xd4, 0xe5, 0xf6]);
        assert!(cfg.is_helmet(&helmet));
        assert!(!cfg.is_helmet(&DeviceId([0; 6])));
        assert_eq!(cfg.distance_offset, 2.5);
    }

    #[test]
    fn malformed_helmet_id_is_a_json_error() {
        let err = TrackerConfig::from_json_str(r#"{ "helmet_ids": ["nothex"] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn load_json_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "history_capacity": 16 }}"#).unwrap();
        let cfg = TrackerConfig::load_json(file.path()).unwrap();
        assert_eq!(cfg.history_capacity, 16);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrackerConfig::load_json(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
