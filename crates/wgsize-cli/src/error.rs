//! Error types for the wgsize CLI.

use thiserror::Error;
use wgsize_core::WgSizeError;

/// CLI result type alias.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error type.
#[derive(Error, Debug)]
pub enum CliError {
    /// IO error while reading device or config files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by the resolver.
    #[error(transparent)]
    Resolver(#[from] WgSizeError),

    /// Device description could not be parsed.
    #[error("Invalid device file: {0}")]
    DeviceFile(String),

    /// Output serialization failed.
    #[error("Output error: {0}")]
    Output(String),
}

impl From<toml::de::Error> for CliError {
    fn from(e: toml::de::Error) -> Self {
        CliError::DeviceFile(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}
