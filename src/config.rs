use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::export::{ContainerFormat, QualityPreset};

/// Main configuration for the Overlay-Compositor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Render timing settings
    pub video: VideoConfig,

    /// Export job settings
    pub export: ExportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video: VideoConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.video.validate()?;
        Ok(())
    }
}

/// Render timing configuration
///
/// The output frame rate is fixed per run, never derived from the source
/// frame rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Output frame rate (frames per second)
    pub frame_rate: i32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self { frame_rate: 30 }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        if self.frame_rate <= 0 || self.frame_rate > 240 {
            return Err(ConfigError::InvalidValue {
                key: "video.frame_rate".to_string(),
                value: self.frame_rate.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Export job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output container; a single fixed choice per build
    pub container: ContainerFormat,

    /// Encode quality preset
    pub quality: QualityPreset,

    /// Lay the file out for progressive download (fast-start)
    pub optimize_for_network_use: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            container: ContainerFormat::Mov,
            quality: QualityPreset::HighestQuality,
            optimize_for_network_use: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.video.frame_rate, 30);
        assert_eq!(config.export.container, ContainerFormat::Mov);
        assert!(config.export.optimize_for_network_use);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let mut original = Config::default();
        original.export.container = ContainerFormat::Mp4;

        original.save_to_file(&file_path).unwrap();
        let loaded = Config::from_file(&file_path).unwrap();

        assert_eq!(original.video.frame_rate, loaded.video.frame_rate);
        assert_eq!(loaded.export.container, ContainerFormat::Mp4);
    }

    #[test]
    fn test_invalid_frame_rate() {
        let mut config = Config::default();
        config.video.frame_rate = 0;
        assert!(config.validate().is_err());

        config.video.frame_rate = -30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/overlay.toml").unwrap_err();
        assert!(matches!(
            err,
            crate::error::CompositorError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
