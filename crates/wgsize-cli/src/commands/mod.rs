//! CLI command implementations.

pub mod arch;
pub mod presets;
pub mod resolve;

use std::fs;
use std::io;
use std::path::Path;

use wgsize_core::device::DeviceProfile;

use crate::error::CliResult;

/// Output format shared by the reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON for programmatic consumption.
    Json,
}

/// Load a device description from a TOML file.
///
/// The file holds the fields of a [`DeviceProfile`] at the top level. A
/// missing `name` falls back to the file stem.
pub fn load_device_file(path: &Path) -> CliResult<DeviceProfile> {
    tracing::debug!(path = %path.display(), "loading device file");
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => io::Error::new(
            io::ErrorKind::NotFound,
            format!("Device file not found: {}", path.display()),
        ),
        _ => e,
    })?;
    let mut device = parse_device(&content)?;
    if device.name.is_empty() {
        device.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    Ok(device)
}

/// Parse a device description from TOML text.
pub fn parse_device(content: &str) -> CliResult<DeviceProfile> {
    let device: DeviceProfile = toml::from_str(content)?;
    device.validate()?;
    Ok(device)
}
