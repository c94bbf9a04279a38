//! Persistent configuration for Lil Snippy.
//!
//! Stored as JSON in `~/.config/lil-snippy/config.json` (platform config
//! directory). Every key is optional; missing keys take their defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs::{cache_dir, config_dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const APP_CONFIG_DIR_NAME: &str = "lil-snippy";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Capture history directory; relative paths resolve against the working directory
    pub capture_dir: PathBuf,
    /// Directory with the ocrs `.rten` models; `None` means the ocrs cache directory
    pub model_dir: Option<PathBuf>,
    pub log_level: String,
    pub min_selection_size: u32,
    pub overlay_opacity: f32,
    pub settle_delay_ms: u64,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture_dir: PathBuf::from("snips"),
            model_dir: None,
            log_level: "info".to_string(),
            min_selection_size: overlay::MIN_SELECTION_SIZE,
            overlay_opacity: 0.3,
            settle_delay_ms: 150,
            window_width: 800.0,
            window_height: 600.0,
        }
    }
}

impl Config {
    /// Location of the config file, if the platform has a config directory
    pub fn path() -> Option<PathBuf> {
        Some(config_dir()?.join(APP_CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Read `path`; a missing file gives the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        let data = fs::read_to_string(path)?;
        let config = serde_json::from_str(&data)?;
        debug!(?path, "Config loaded");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        debug!(?path, "Config saved");
        Ok(())
    }

    pub fn model_dir(&self) -> PathBuf {
        self.model_dir
            .clone()
            .or_else(|| cache_dir().map(|dir| dir.join("ocrs")))
            .unwrap_or_else(|| PathBuf::from("models"))
    }

    pub fn overlay_opacity(&self) -> f32 {
        if self.overlay_opacity.is_finite() {
            self.overlay_opacity.clamp(0.0, 1.0)
        } else {
            Self::default().overlay_opacity
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn window_size(&self) -> [f32; 2] {
        [self.window_width.max(320.0), self.window_height.max(240.0)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("lil_snippy_config_{}", uuid::Uuid::new_v4()))
            .join(CONFIG_FILE_NAME)
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load_from(&scratch_file()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.capture_dir, PathBuf::from("snips"));
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let path = scratch_file();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{ "capture_dir": "/tmp/my-snips", "settle_delay_ms": 0 }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.capture_dir, PathBuf::from("/tmp/my-snips"));
        assert_eq!(config.settle_delay(), Duration::ZERO);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.min_selection_size, overlay::MIN_SELECTION_SIZE);
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = scratch_file();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ capture_dir: ").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ConfigError::Json(_))));
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn saved_file_loads_back() {
        let path = scratch_file();
        let config = Config {
            model_dir: Some(PathBuf::from("/opt/models")),
            overlay_opacity: 0.5,
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn explicit_model_dir_wins() {
        let config = Config {
            model_dir: Some(PathBuf::from("/opt/models")),
            ..Config::default()
        };
        assert_eq!(config.model_dir(), PathBuf::from("/opt/models"));
    }

    #[test]
    fn opacity_is_clamped() {
        let config = Config {
            overlay_opacity: 4.0,
            ..Config::default()
        };
        assert_eq!(config.overlay_opacity(), 1.0);

        let config = Config {
            overlay_opacity: f32::NAN,
            ..Config::default()
        };
        assert_eq!(config.overlay_opacity(), 0.3);
    }
}
