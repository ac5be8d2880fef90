//! `wgsize resolve` command - Resolve launch geometry for a reduction.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use wgsize_core::config::ReductionConfig;
use wgsize_core::device::DeviceProfile;
use wgsize_core::occupancy::recommended_groups_per_compute_unit;
use wgsize_core::{GeometryResolver, LaunchPlan, LaunchRequest, WgSizeError};

use crate::error::CliResult;

use super::{load_device_file, OutputFormat};

/// Arguments of the `resolve` command.
#[derive(Debug, Clone)]
pub struct ResolveArgs {
    /// Total number of work-items in the reduction range.
    pub items: usize,
    /// Local memory each work-item needs, in bytes.
    pub local_bytes: usize,
    /// Kernel-specific work-group limit, 0 when unknown.
    pub kernel_max: usize,
    /// Built-in device preset.
    pub preset: Option<String>,
    /// Device description file.
    pub device: Option<PathBuf>,
    /// Reduction config file.
    pub config: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
}

/// Everything `resolve` reports.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveReport {
    /// Device the plan was made for.
    pub device: DeviceProfile,
    /// Total work-items requested.
    pub total_work_items: usize,
    /// Local memory per work-item, in bytes.
    pub local_mem_per_item: usize,
    /// Kernel limit, if one was given.
    pub kernel_max_work_group_size: Option<usize>,
    /// Preferred size before kernel limits and distribution.
    pub preferred_work_group_size: usize,
    /// The launch plan.
    pub plan: LaunchPlan,
    /// Work-items in the final group.
    pub last_group_size: usize,
    /// Recommended resident groups per compute unit.
    pub groups_per_compute_unit: usize,
    /// Capability code of the device architecture.
    pub capability_code: Option<u32>,
}

/// Execute the `resolve` command.
pub fn execute(args: &ResolveArgs) -> CliResult<()> {
    let device = match (&args.preset, &args.device) {
        (Some(name), _) => Some(DeviceProfile::preset(name)?),
        (None, Some(path)) => Some(load_device_file(path)?),
        (None, None) => None,
    };

    let config = match &args.config {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading reduction config");
            ReductionConfig::load(path)?
        }
        None => ReductionConfig::from_env()?,
    }
    .apply_compact_env()?;
    tracing::debug!(?config, "effective reduction config");

    let request = LaunchRequest::new(args.items, args.local_bytes)?.with_kernel_max(args.kernel_max);
    let report = build_report(device, &request, config)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

/// Resolve `request` on `device` and collect the report.
pub fn build_report(
    device: Option<DeviceProfile>,
    request: &LaunchRequest,
    config: ReductionConfig,
) -> CliResult<ResolveReport> {
    let device = device.ok_or(WgSizeError::MissingDevice)?;
    let resolver = GeometryResolver::new(config);
    let plan = resolver.plan_for(&device, request)?;

    let size = plan.geometry.work_group_size;
    let local_bytes = size.saturating_mul(request.local_mem_per_item());

    Ok(ResolveReport {
        preferred_work_group_size: resolver
            .preferred_group_size(&device, request.local_mem_per_item()),
        last_group_size: plan.geometry.last_group_size(request.total_work_items()),
        groups_per_compute_unit: recommended_groups_per_compute_unit(&device, size, local_bytes),
        capability_code: device.capability_code(),
        total_work_items: request.total_work_items(),
        local_mem_per_item: request.local_mem_per_item(),
        kernel_max_work_group_size: request.kernel_max_work_group_size(),
        plan,
        device,
    })
}

fn print_report(report: &ResolveReport) {
    let device = &report.device;

    println!("{} Resolving launch geometry", "→".bright_cyan());
    println!(
        "  {} Device: {} ({}, {})",
        "•".dimmed(),
        device.name.bright_yellow(),
        device.device_class,
        device.backend
    );
    println!(
        "  {} Work-items: {}",
        "•".dimmed(),
        report.total_work_items.to_string().bright_yellow()
    );
    println!(
        "  {} Local memory per item: {} bytes",
        "•".dimmed(),
        report.local_mem_per_item
    );
    if let Some(kernel_max) = report.kernel_max_work_group_size {
        println!("  {} Kernel limit: {}", "•".dimmed(), kernel_max);
    }
    println!();

    let geometry = &report.plan.geometry;
    println!("{}", "Launch plan".bold());
    println!(
        "  Work-group size:   {}",
        geometry.work_group_size.to_string().bright_green()
    );
    println!(
        "  Work-group count:  {}",
        geometry.work_group_count.to_string().bright_green()
    );
    println!("  Global size:       {}", geometry.global_size());
    println!("  Last group:        {}", report.last_group_size);
    println!("  Size limit:        {}", report.plan.max_work_group_size);
    println!("  Preferred size:    {}", report.preferred_work_group_size);
    println!("  Concurrent groups: {}", report.plan.concurrent_groups);
    println!(
        "  Kernel bundle:     {}",
        if report.plan.use_kernel_bundle {
            "yes".bright_green()
        } else {
            "no".dimmed()
        }
    );
    println!("  Groups per CU:     {}", report.groups_per_compute_unit);
    if let Some(code) = report.capability_code {
        println!("  Capability code:   {}", code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgsize_core::config::ConfigBuilder;
    use wgsize_core::device::DeviceClass;
    use wgsize_core::LaunchGeometry;

    use crate::error::CliError;

    #[test]
    fn test_report_for_integrated_gpu() {
        let request = LaunchRequest::new(160, 0).unwrap();
        let report = build_report(
            Some(DeviceProfile::intel_hd()),
            &request,
            ReductionConfig::default(),
        )
        .unwrap();

        assert_eq!(report.plan.geometry, LaunchGeometry::new(160, 1));
        assert_eq!(report.preferred_work_group_size, 256);
        assert_eq!(report.last_group_size, 160);
        assert_eq!(report.groups_per_compute_unit, 1);
        assert_eq!(report.capability_code, None);
    }

    #[test]
    fn test_report_for_cuda_device() {
        let request = LaunchRequest::new(1000, 0).unwrap();
        let report = build_report(
            Some(DeviceProfile::nvidia_ada()),
            &request,
            ReductionConfig::default(),
        )
        .unwrap();

        assert_eq!(report.plan.geometry, LaunchGeometry::new(256, 4));
        assert_eq!(report.last_group_size, 232);
        assert_eq!(report.capability_code, Some(890));
    }

    #[test]
    fn test_report_honors_config() {
        let config = ConfigBuilder::new()
            .preferred_size(DeviceClass::Gpu, 64)
            .kernel_bundles("level_zero", true)
            .build()
            .unwrap();
        let request = LaunchRequest::new(160, 0).unwrap();
        let report = build_report(Some(DeviceProfile::intel_hd()), &request, config).unwrap();

        assert_eq!(report.plan.max_work_group_size, 64);
        assert_eq!(report.plan.geometry, LaunchGeometry::new(32, 5));
        assert!(report.plan.use_kernel_bundle);
    }

    #[test]
    fn test_report_for_full_address_space() {
        let request = LaunchRequest::new(usize::MAX, 0).unwrap();
        let report = build_report(
            Some(DeviceProfile::intel_hd()),
            &request,
            ReductionConfig::default(),
        )
        .unwrap();

        assert_eq!(report.plan.geometry, LaunchGeometry::new(256, 1 << 56));
        assert_eq!(report.plan.geometry.global_size(), usize::MAX);
        assert_eq!(report.last_group_size, 255);
    }

    #[test]
    fn test_report_without_device() {
        let request = LaunchRequest::new(160, 0).unwrap();
        let err = build_report(None, &request, ReductionConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Resolver(WgSizeError::MissingDevice)));
    }

    #[test]
    fn test_report_serializes() {
        let request = LaunchRequest::new(4096, 4).unwrap().with_kernel_max(128);
        let report = build_report(
            Some(DeviceProfile::amd_mi200()),
            &request,
            ReductionConfig::default(),
        )
        .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["device"]["backend"], "hip");
        assert_eq!(json["kernel_max_work_group_size"], 128);
        assert_eq!(json["plan"]["geometry"]["work_group_size"], 128);
        assert_eq!(json["plan"]["geometry"]["work_group_count"], 32);
    }
}
