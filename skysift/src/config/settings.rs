//! Settings structs for each `[section]` of the config file.
//!
//! Pure data types with defaults; parsing and serialization live in
//! [`super::file`].

use std::path::PathBuf;

/// Default evaluation-service endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8090";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default drive folder for exports.
pub const DEFAULT_EXPORT_FOLDER: &str = "skysift";

/// Default export sample spacing in meters per pixel.
pub const DEFAULT_EXPORT_SCALE: f64 = 10.0;

/// Default export pixel cap.
pub const DEFAULT_EXPORT_MAX_PIXELS: u64 = 100_000_000;

/// Remote engine connection settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Evaluation service base URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Export defaults applied when the caller leaves them unset.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    /// Drive folder exports land in
    pub folder: String,
    /// Sample spacing in meters per pixel
    pub scale: f64,
    /// Upper bound on rendered pixels
    pub max_pixels: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            folder: DEFAULT_EXPORT_FOLDER.to_string(),
            scale: DEFAULT_EXPORT_SCALE,
            max_pixels: DEFAULT_EXPORT_MAX_PIXELS,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Directory log files are written to
    pub directory: PathBuf,
    /// Log file name
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file: "skysift.log".to_string(),
        }
    }
}
