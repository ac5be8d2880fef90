//! Fuzz target for launch geometry resolution.
//!
//! Resolves random requests on random devices and checks that every
//! geometry stays within the device and kernel limits and tightly covers
//! the range.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wgsize_core::prelude::*;

/// Backends the fuzzer picks from.
#[derive(Debug, Arbitrary)]
enum Backend {
    Cuda,
    Hip,
    LevelZero,
    OpenCl,
}

impl Backend {
    fn id(&self) -> &'static str {
        match self {
            Backend::Cuda => BackendId::CUDA,
            Backend::Hip => BackendId::HIP,
            Backend::LevelZero => BackendId::LEVEL_ZERO,
            Backend::OpenCl => BackendId::OPENCL,
        }
    }
}

/// Fuzz input: device capabilities, tuning, and one request.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    class: u8,
    backend: Backend,
    max_work_group_size: u16,
    local_mem_bytes: u32,
    compute_units: u16,
    unified: bool,
    registers: Option<u32>,
    preferred: Option<u16>,
    total_work_items: u32,
    local_mem_per_item: u16,
    kernel_max: u16,
}

fuzz_target!(|input: FuzzInput| {
    // Zero-sized devices and ranges are rejected before resolution
    if input.max_work_group_size == 0 || input.compute_units == 0 || input.total_work_items == 0 {
        return;
    }

    let class = DeviceClass::ALL[usize::from(input.class) % DeviceClass::ALL.len()];
    let mut device = DeviceProfile::new(
        class,
        input.backend.id(),
        usize::from(input.max_work_group_size),
        u32::from(input.compute_units),
    )
    .with_local_mem(input.local_mem_bytes as usize)
    .with_unified_memory(input.unified);
    device.max_registers_per_group = input.registers;

    let mut config = ReductionConfig::default();
    config
        .preferred_work_group_size
        .set(class, input.preferred.map(usize::from));
    let resolver = GeometryResolver::new(config);

    let total = input.total_work_items as usize;
    let request = match LaunchRequest::new(total, usize::from(input.local_mem_per_item)) {
        Ok(request) => request.with_kernel_max(usize::from(input.kernel_max)),
        Err(_) => return,
    };

    let max = resolver.max_group_size(&device, request.local_mem_per_item());
    assert!(max >= 1 && max <= device.max_work_group_size, "max {} out of range", max);

    let plan = resolver.plan(Some(&device), &request).expect("valid device must plan");
    let geometry = plan.geometry;

    assert!(geometry.work_group_size >= 1);
    assert!(geometry.work_group_size <= device.max_work_group_size);
    if input.kernel_max > 0 {
        assert!(geometry.work_group_size <= usize::from(input.kernel_max));
    }
    assert!(geometry.covers(total), "{:?} does not cover {}", geometry, total);
    if device.backend == BackendId::cuda() {
        assert!(geometry.work_group_size.is_power_of_two());
    }
    assert!(plan.concurrent_groups >= device.compute_units);
});
