//! `wgsize presets` command - List the built-in device presets.

use colored::Colorize;

use wgsize_core::device::DeviceProfile;

use crate::error::CliResult;

use super::OutputFormat;

/// All built-in presets in listing order.
pub fn all() -> CliResult<Vec<DeviceProfile>> {
    DeviceProfile::PRESETS
        .iter()
        .map(|name| DeviceProfile::preset(name).map_err(Into::into))
        .collect()
}

/// Execute the `presets` command.
pub fn execute(format: OutputFormat) -> CliResult<()> {
    let presets = all()?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&presets)?);
        return Ok(());
    }

    println!("{} Built-in device presets", "→".bright_cyan());
    println!();
    println!(
        "  {:<16} {:<11} {:<11} {:>8} {:>10} {:>5}  {}",
        "NAME".bold(),
        "CLASS".bold(),
        "BACKEND".bold(),
        "MAX WG".bold(),
        "LOCAL MEM".bold(),
        "CUs".bold(),
        "ARCH".bold()
    );
    for device in &presets {
        println!(
            "  {:<16} {:<11} {:<11} {:>8} {:>10} {:>5}  {}",
            device.name.bright_yellow(),
            device.device_class.to_string(),
            device.backend.to_string(),
            device.max_work_group_size,
            format!("{}K", device.local_mem_bytes / 1024),
            device.compute_units,
            device.arch.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
