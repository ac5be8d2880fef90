//! Error types for wgsize.
//!
//! The resolver itself is total over valid inputs. Errors only surface at the
//! boundaries: building a request, validating a device profile, or loading
//! configuration.

use thiserror::Error;

/// Result type alias for wgsize operations.
pub type Result<T> = std::result::Result<T, WgSizeError>;

/// Error type for wgsize operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WgSizeError {
    /// A launch request violates the resolver's input contract.
    #[error("Invalid launch request: {0}")]
    InvalidRequest(String),

    /// A device profile is not usable for sizing.
    #[error("Invalid device profile: {0}")]
    InvalidDevice(String),

    /// Configuration could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Planning was requested without a device to size against.
    #[error("No device available to size the launch against")]
    MissingDevice,

    /// A named device preset does not exist.
    #[error("Unknown device preset: {0}")]
    UnknownPreset(String),
}

impl From<config::ConfigError> for WgSizeError {
    fn from(e: config::ConfigError) -> Self {
        WgSizeError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WgSizeError::InvalidRequest("total_work_items must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid launch request: total_work_items must be > 0"
        );
        assert_eq!(
            WgSizeError::MissingDevice.to_string(),
            "No device available to size the launch against"
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let err: WgSizeError = config::ConfigError::Message("bad key".to_string()).into();
        assert!(matches!(err, WgSizeError::Config(ref msg) if msg.contains("bad key")));
    }
}
