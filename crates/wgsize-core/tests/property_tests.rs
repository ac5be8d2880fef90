//! Property-based tests for launch geometry invariants.
//!
//! # Key invariants
//! - `compute_group_size` never exceeds the limit and never launches a spare group
//! - resolved sizes are within `1..=device max`
//! - CUDA-class geometries are powers of two
//! - every resolver function is deterministic

use proptest::prelude::*;
use wgsize_core::prelude::*;

fn device_strategy() -> impl Strategy<Value = DeviceProfile> {
    (
        prop_oneof![
            Just(DeviceClass::Cpu),
            Just(DeviceClass::Gpu),
            Just(DeviceClass::Accelerator)
        ],
        prop_oneof![Just("cuda"), Just("hip"), Just("level_zero"), Just("opencl")],
        1usize..=4096,
        0usize..=(256 * 1024),
        1u32..=256,
        any::<bool>(),
        proptest::option::of(1u32..=(128 * 1024)),
    )
        .prop_map(|(class, backend, max_wg, local, units, unified, regs)| {
            let mut profile = DeviceProfile::new(class, backend, max_wg, units)
                .with_name("prop-device")
                .with_local_mem(local)
                .with_unified_memory(unified);
            profile.max_registers_per_group = regs;
            profile
        })
}

fn config_strategy() -> impl Strategy<Value = ReductionConfig> {
    (
        proptest::option::of(0usize..=2048),
        proptest::option::of(0usize..=2048),
        proptest::option::of(0usize..=2048),
        any::<bool>(),
    )
        .prop_map(|(cpu, gpu, acc, cuda_bundles)| {
            let mut config = ReductionConfig::default();
            config.preferred_work_group_size.cpu = cpu;
            config.preferred_work_group_size.gpu = gpu;
            config.preferred_work_group_size.accelerator = acc;
            config
                .kernel_bundles
                .insert(BackendId::cuda(), cuda_bundles);
            config
        })
}

proptest! {
    #[test]
    fn prop_distribution_covers_range(total in 1usize..=1_000_000, max in 1usize..=4096) {
        let g = compute_group_size(total, max);
        prop_assert!(g.work_group_size >= 1);
        prop_assert!(g.work_group_size <= max, "size {} > max {}", g.work_group_size, max);
        prop_assert!(g.work_group_count * g.work_group_size >= total);
        prop_assert!((g.work_group_count - 1) * g.work_group_size < total);
    }

    #[test]
    fn prop_distribution_never_beats_ceiling_by_less(total in 1usize..=1_000_000, max in 1usize..=4096) {
        let g = compute_group_size(total, max);
        // A uniform split is only chosen when it fits under the same limit.
        if g.work_group_size != max && g.work_group_count > 1 {
            prop_assert!(g.is_uniform(total));
            prop_assert!(g.work_group_count <= max);
        }
    }

    #[test]
    fn prop_max_group_size_within_device_limit(
        device in device_strategy(),
        local in 0usize..=4096,
    ) {
        let policies = RegisterPolicies::default();
        let size = max_group_size(&device, local, &policies);
        prop_assert!(size >= 1);
        prop_assert!(size <= device.max_work_group_size);
        if device.backend == BackendId::cuda() {
            prop_assert!(size.is_power_of_two());
        }
    }

    #[test]
    fn prop_geometry_respects_all_limits(
        device in device_strategy(),
        config in config_strategy(),
        total in 1usize..=1_000_000,
        local in 0usize..=1024,
        kernel_max in 0usize..=2048,
    ) {
        let resolver = GeometryResolver::new(config);
        let request = LaunchRequest::new(total, local).unwrap().with_kernel_max(kernel_max);
        let g = resolver.geometry(&device, &request);

        prop_assert!(g.work_group_size >= 1);
        prop_assert!(g.work_group_size <= device.max_work_group_size);
        if kernel_max > 0 {
            prop_assert!(g.work_group_size <= kernel_max);
        }
        prop_assert!(g.covers(total), "{:?} does not tightly cover {}", g, total);
        if device.backend == BackendId::cuda() {
            prop_assert!(g.work_group_size.is_power_of_two());
        }
    }

    #[test]
    fn prop_resolver_is_deterministic(
        device in device_strategy(),
        config in config_strategy(),
        total in 1usize..=100_000,
        local in 0usize..=1024,
    ) {
        let resolver = GeometryResolver::new(config);
        let request = LaunchRequest::new(total, local).unwrap();

        prop_assert_eq!(
            resolver.max_group_size(&device, local),
            resolver.max_group_size(&device, local)
        );
        prop_assert_eq!(
            resolver.preferred_group_size(&device, local),
            resolver.preferred_group_size(&device, local)
        );
        prop_assert_eq!(
            resolver.estimate_concurrent_groups(Some(&device)),
            resolver.estimate_concurrent_groups(Some(&device))
        );
        prop_assert_eq!(
            resolver.should_use_kernel_bundle(Some(&device)),
            resolver.should_use_kernel_bundle(Some(&device))
        );
        prop_assert_eq!(
            resolver.plan(Some(&device), &request),
            resolver.plan(Some(&device), &request)
        );
    }

    #[test]
    fn prop_concurrency_at_least_compute_units(device in device_strategy()) {
        let estimate = estimate_concurrent_groups(Some(&device));
        prop_assert!(estimate >= device.compute_units);
    }
}
