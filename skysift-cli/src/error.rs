//! CLI error handling with user-friendly messages.

use skysift::engine::EngineError;
use skysift::export::ExportError;
use skysift::filter::FilterError;
use std::fmt;
use std::process;

/// CLI-specific errors with consistent formatting and exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Malformed filter argument (dates, thresholds)
    Filter(FilterError),
    /// Evaluation failed
    Engine(EngineError),
    /// Export request was rejected before submission
    Export(ExportError),
    /// Failed to serialize the request tree
    Serialization(serde_json::Error),
}

impl CliError {
    /// Exits the process with an error message and appropriate hints.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Engine(EngineError::UnknownCollection(_)) => {
                eprintln!();
                eprintln!("The demo catalog only contains COPERNICUS/S2.");
                eprintln!("Run without --collection to use the default.");
            }
            CliError::Export(_) => {
                eprintln!();
                eprintln!("Check that --scale and --max-pixels are positive and a");
                eprintln!("region is available (the demo clip boundary is used by default).");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "configuration error: {}", msg),
            CliError::Filter(e) => write!(f, "invalid filter argument: {}", e),
            CliError::Engine(e) => write!(f, "evaluation failed: {}", e),
            CliError::Export(e) => write!(f, "export rejected: {}", e),
            CliError::Serialization(e) => write!(f, "failed to serialize request: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Filter(e) => Some(e),
            CliError::Engine(e) => Some(e),
            CliError::Export(e) => Some(e),
            CliError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FilterError> for CliError {
    fn from(e: FilterError) -> Self {
        CliError::Filter(e)
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        CliError::Engine(e)
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        CliError::Export(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e)
    }
}
