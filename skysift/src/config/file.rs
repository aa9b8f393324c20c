//! Config file loading and saving.

use super::settings::{EngineSettings, ExportSettings, LoggingSettings};
use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse the config file
    #[error("failed to read config file: {0}")]
    Read(#[from] ini::Error),

    /// Failed to write the config file
    #[error("failed to write config file: {0}")]
    Write(std::io::Error),

    /// Failed to create the config directory
    #[error("failed to create config directory: {0}")]
    Directory(std::io::Error),
}

/// Application configuration loaded from config.ini.
///
/// Unknown sections and keys are ignored; missing ones fall back to their
/// defaults, so old config files keep working across upgrades.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub engine: EngineSettings,
    pub export: ExportSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Loads from the default path (~/.skysift/config.ini). A missing file
    /// yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads from a specific path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        Ok(Self::from_ini(&ini))
    }

    fn from_ini(ini: &Ini) -> Self {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("engine")) {
            if let Some(endpoint) = section.get("endpoint") {
                config.engine.endpoint = endpoint.to_string();
            }
            if let Some(timeout) = section.get("timeout_secs").and_then(|v| v.parse().ok()) {
                config.engine.timeout_secs = timeout;
            }
        }

        if let Some(section) = ini.section(Some("export")) {
            if let Some(folder) = section.get("folder") {
                config.export.folder = folder.to_string();
            }
            if let Some(scale) = section.get("scale").and_then(|v| v.parse().ok()) {
                config.export.scale = scale;
            }
            if let Some(max_pixels) = section.get("max_pixels").and_then(|v| v.parse().ok()) {
                config.export.max_pixels = max_pixels;
            }
        }

        if let Some(section) = ini.section(Some("logging")) {
            if let Some(directory) = section.get("directory") {
                config.logging.directory = PathBuf::from(directory);
            }
            if let Some(file) = section.get("file") {
                config.logging.file = file.to_string();
            }
        }

        config
    }

    /// Saves to a specific path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Directory)?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some("engine"))
            .set("endpoint", &self.engine.endpoint)
            .set("timeout_secs", self.engine.timeout_secs.to_string());
        ini.with_section(Some("export"))
            .set("folder", &self.export.folder)
            .set("scale", self.export.scale.to_string())
            .set("max_pixels", self.export.max_pixels.to_string());
        ini.with_section(Some("logging"))
            .set("directory", self.logging.directory.display().to_string())
            .set("file", &self.logging.file);

        ini.write_to_file(path).map_err(ConfigError::Write)
    }
}

/// Path to the config directory (~/.skysift).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".skysift")
}

/// Path to the config file (~/.skysift/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("nope.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.engine.endpoint = "http://engine.example:9000".to_string();
        config.engine.timeout_secs = 30;
        config.export.folder = "earthengine".to_string();
        config.export.scale = 20.0;
        config.export.max_pixels = 1_000_000_000;
        config.logging.file = "session.log".to_string();

        config.save_to(&path).unwrap();
        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[engine]\nendpoint = http://only.this\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.engine.endpoint, "http://only.this");
        assert_eq!(config.engine.timeout_secs, EngineSettings::default().timeout_secs);
        assert_eq!(config.export, ExportSettings::default());
    }

    #[test]
    fn test_malformed_numbers_fall_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[export]\nscale = lots\nmax_pixels = -3\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.export.scale, ExportSettings::default().scale);
        assert_eq!(config.export.max_pixels, ExportSettings::default().max_pixels);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("deep").join("nested").join("config.ini");
        ConfigFile::default().save_to(&path).unwrap();
        assert!(path.exists());
    }
}
