//! User configuration for ~/.skysift/config.ini.
//!
//! Settings structs are pure data ([`settings`]); loading, parsing and
//! saving live in [`file`]. Missing files and missing keys fall back to
//! defaults rather than erroring.

mod file;
mod settings;

pub use file::{config_directory, config_file_path, ConfigError, ConfigFile};
pub use settings::{EngineSettings, ExportSettings, LoggingSettings};
