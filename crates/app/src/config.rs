use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// App configuration, read from `<config_dir>/config.toml`. A missing file
/// or missing fields fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub ocr: OcrConfig,
    pub camera: CameraConfig,
    /// Override for the intake watch folder. Defaults to `<data_dir>/intake`.
    pub intake_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OcrConfig {
    pub lang: String,
    pub tessdata_path: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            lang: "eng".to_string(),
            tessdata_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// External command whose stdout is one captured frame. Capture is only
    /// offered when this is set and the device node exists.
    pub capture_command: Option<String>,
    /// Device node probed for capture availability.
    pub device: PathBuf,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            capture_command: None,
            device: PathBuf::from("/dev/video0"),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = AppConfig::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.ocr.lang, "eng");
        assert!(cfg.camera.capture_command.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[ocr]\nlang = \"deu\"\n\n[camera]\ncapture_command = \"capture-frame\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.ocr.lang, "deu");
        assert_eq!(cfg.camera.capture_command.as_deref(), Some("capture-frame"));
        assert_eq!(cfg.camera.device, PathBuf::from("/dev/video0"));
        assert!(cfg.intake_dir.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ocr = not toml at all [").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
