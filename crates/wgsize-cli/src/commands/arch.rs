//! `wgsize arch` command - Show the capability code of an architecture tag.

use colored::Colorize;
use serde::Serialize;

use wgsize_core::arch::CudaArch;

use crate::error::CliResult;

use super::OutputFormat;

/// Lookup result for one architecture tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchInfo {
    /// Tag as given.
    pub tag: String,
    /// Integer capability code, if the tag has one.
    pub capability_code: Option<u32>,
    /// Compute capability as (major, minor).
    pub compute_capability: Option<(u32, u32)>,
    /// Whether the target enables architecture-specific features.
    pub arch_specific: bool,
}

/// Describe `tag`.
pub fn describe(tag: &str) -> ArchInfo {
    match tag.parse::<CudaArch>() {
        Ok(arch) => ArchInfo {
            tag: tag.to_string(),
            capability_code: Some(arch.code()),
            compute_capability: Some(arch.compute_capability()),
            arch_specific: arch.has_arch_specific_features(),
        },
        Err(_) => ArchInfo {
            tag: tag.to_string(),
            capability_code: None,
            compute_capability: None,
            arch_specific: false,
        },
    }
}

/// Execute the `arch` command.
pub fn execute(tag: &str, format: OutputFormat) -> CliResult<()> {
    let info = describe(tag);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        OutputFormat::Text => match (info.capability_code, info.compute_capability) {
            (Some(code), Some((major, minor))) => {
                println!(
                    "{} {} → {} (compute {}.{})",
                    "✓".green(),
                    info.tag.bright_white(),
                    code.to_string().bright_green(),
                    major,
                    minor
                );
                if info.arch_specific {
                    println!(
                        "  {} architecture-specific features enabled",
                        "•".dimmed()
                    );
                }
            }
            _ => println!(
                "{} {} has no capability code",
                "•".dimmed(),
                info.tag.bright_white()
            ),
        },
    }
    Ok(())
}
