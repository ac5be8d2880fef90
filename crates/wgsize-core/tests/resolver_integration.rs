//! End-to-end resolver behavior against realistic device profiles.

use std::fs;
use std::sync::Arc;
use std::thread;

use wgsize_core::config::{load_config_from_str, ReductionConfig};
use wgsize_core::prelude::*;

#[test]
fn test_reference_distributions() {
    assert_eq!(compute_group_size(160, 128), LaunchGeometry::new(32, 5));
    assert_eq!(compute_group_size(150, 128), LaunchGeometry::new(128, 2));
    assert_eq!(compute_group_size(100, 128), LaunchGeometry::new(100, 1));
}

#[test]
fn test_cpu_default_ignores_large_device_max() {
    let cpu = DeviceProfile::new(DeviceClass::Cpu, "opencl", 1024, 8);
    let resolver = GeometryResolver::default();
    assert_eq!(resolver.preferred_group_size(&cpu, 0), 16);
    assert_eq!(resolver.preferred_group_size(&cpu, 64), 16);
}

#[test]
fn test_concurrency_reference_values() {
    let resolver = GeometryResolver::default();
    assert_eq!(resolver.estimate_concurrent_groups(None), 8);

    let gpu = DeviceProfile::new(DeviceClass::Gpu, "level_zero", 512, 20).with_unified_memory(true);
    assert_eq!(resolver.estimate_concurrent_groups(Some(&gpu)), 160);
}

#[test]
fn test_no_local_memory_only_limited_by_device() {
    let resolver = GeometryResolver::default();
    for preset in ["intel-hd", "amd-mi200", "fpga-emulator", "host-cpu"] {
        let device = DeviceProfile::preset(preset).unwrap();
        assert_eq!(
            resolver.max_group_size(&device, 0),
            device.max_work_group_size,
            "{}",
            preset
        );
    }
}

#[test]
fn test_kernel_query_fallback_chain() {
    let resolver = GeometryResolver::default();
    let device = DeviceProfile::amd_mi200();

    let compiled = KernelInfo::new("sum_f32", 256);
    assert_eq!(resolver.max_group_size_for_kernel(&device, &compiled, 4096), 256);

    let uncompiled = KernelInfo::unknown("sum_f32");
    assert_eq!(
        resolver.max_group_size_for_kernel(&device, &uncompiled, 4096),
        resolver.max_group_size(&device, 4096)
    );
}

#[test]
fn test_kernel_limit_above_memory_heuristic_drives_plan() {
    let resolver = GeometryResolver::default();
    let device = DeviceProfile::amd_mi200();
    // 65536 / 256 = 256 -> halved to 128 by the device heuristic
    assert_eq!(resolver.max_group_size(&device, 256), 128);

    let kernel = KernelInfo::new("sum_f64", 512);
    let request = LaunchRequest::new(8192, 256)
        .unwrap()
        .with_kernel(&kernel, &device);
    let plan = resolver.plan(Some(&device), &request).unwrap();

    assert_eq!(
        plan.max_work_group_size,
        resolver.max_group_size_for_kernel(&device, &kernel, 256)
    );
    assert_eq!(plan.max_work_group_size, 512);
    assert_eq!(plan.geometry, LaunchGeometry::new(512, 16));
}

#[test]
fn test_config_overrides_flow_into_plan() {
    let toml = r#"
        [preferred_work_group_size]
        gpu = 64

        [kernel_bundles]
        hip = true
    "#;
    let config = load_config_from_str(toml).unwrap();
    let resolver = GeometryResolver::new(config);

    let device = DeviceProfile::amd_mi200();
    let request = LaunchRequest::new(10_000, 4).unwrap();
    let plan = resolver.plan(Some(&device), &request).unwrap();

    assert_eq!(plan.max_work_group_size, 64);
    // 10_000 = 156 * 64 + 16; 625 groups of 16 would exceed the limit of 64
    assert_eq!(plan.geometry, LaunchGeometry::new(64, 157));
    assert_eq!(plan.concurrent_groups, 110);
    assert!(plan.use_kernel_bundle);
}

#[test]
fn test_load_config_file() {
    let dir = std::env::temp_dir().join(format!("wgsize-config-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("wgsize.toml");
    fs::write(
        &path,
        "[preferred_work_group_size]\ncpu = 4\n\n[kernel_bundles]\nlevel_zero = true\n",
    )
    .unwrap();

    let config = ReductionConfig::load(&path).unwrap();
    assert_eq!(config.preferred_size(DeviceClass::Cpu), Some(4));
    assert!(config.kernel_bundles_enabled(&BackendId::level_zero()));

    let missing = ReductionConfig::load_or_default(dir.join("missing.toml"));
    assert_eq!(missing, ReductionConfig::default());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_custom_register_policy() {
    #[derive(Debug)]
    struct HalfMax;

    impl RegisterPressurePolicy for HalfMax {
        fn clamp(&self, device: &DeviceProfile, candidate: usize) -> usize {
            candidate.min(device.max_work_group_size / 2).max(1)
        }

        fn requires_power_of_two(&self) -> bool {
            false
        }
    }

    let policies = RegisterPolicies::default().with("hip", Arc::new(HalfMax));
    let resolver = GeometryResolver::default().with_policies(policies);

    assert_eq!(resolver.max_group_size(&DeviceProfile::amd_mi200(), 0), 512);
    assert_eq!(resolver.max_group_size(&DeviceProfile::nvidia_ada(), 0), 256);
}

#[test]
fn test_resolver_shared_across_threads() {
    let resolver = Arc::new(GeometryResolver::default());
    let device = Arc::new(DeviceProfile::nvidia_ada());
    let request = LaunchRequest::new(1 << 20, 8).unwrap();
    let expected = resolver.plan(Some(&*device), &request).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let device = Arc::clone(&device);
            thread::spawn(move || resolver.plan(Some(&*device), &request).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_occupancy_matches_resolved_size() {
    let resolver = GeometryResolver::default();
    let device = DeviceProfile::nvidia_ampere();
    let size = resolver.max_group_size(&device, 16);
    assert!(recommended_groups_per_compute_unit(&device, size, size * 16) > 0);
}
