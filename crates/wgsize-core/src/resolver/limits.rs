//! Device- and kernel-derived limits on work-group size.

use crate::config::ReductionConfig;
use crate::device::{DeviceClass, DeviceProfile};
use crate::kernel::KernelQuery;
use crate::registers::RegisterPolicies;

/// Work-group size used on CPU devices when no override is configured.
///
/// Each CPU work-group usually runs on one host thread, so large groups only
/// add partial accumulators without adding parallelism.
pub const DEFAULT_CPU_WORK_GROUP_SIZE: usize = 16;

/// Concurrency estimate used when no device is bound yet.
pub const DEFAULT_CONCURRENT_GROUPS: u32 = 8;

/// Compute-unit multiplier for GPUs with host-unified memory.
pub const UNIFIED_MEMORY_OVERSUBSCRIPTION: u32 = 8;

/// Largest work-group size that can be launched on `device` when each
/// work-item needs `local_mem_per_item` bytes of local memory.
///
/// `local_mem_per_item == 0` means local memory does not constrain the size.
pub fn max_group_size(
    device: &DeviceProfile,
    local_mem_per_item: usize,
    policies: &RegisterPolicies,
) -> usize {
    let device_max = device.max_work_group_size.max(1);
    let unconstrained = device_max.saturating_mul(2);

    let (mem_bound, mut candidate) = if local_mem_per_item > 0 {
        let mut mem_bound = device.local_mem_bytes / local_mem_per_item;
        // Non-power-of-two groups need one extra scratch slot.
        if !mem_bound.is_power_of_two() {
            mem_bound = mem_bound.saturating_sub(1);
        }
        (mem_bound, mem_bound.min(device_max))
    } else {
        (unconstrained, device_max)
    };

    // Filling local memory completely leaves nothing for barriers and
    // builtins, so memory-bound launches get half the computed size.
    if candidate >= 4 && mem_bound < unconstrained {
        candidate /= 2;
    }

    if let Some(policy) = policies.get(&device.backend) {
        let before = candidate;
        candidate = policy.clamp(device, candidate);
        tracing::debug!(
            device = %device.name,
            backend = %device.backend,
            before,
            after = candidate,
            "applied register-pressure limit"
        );
    }

    let resolved = candidate.clamp(1, device_max);
    tracing::debug!(
        device = %device.name,
        device_max,
        local_mem_per_item,
        mem_bound,
        resolved,
        "resolved maximum work-group size"
    );
    resolved
}

/// Like [`max_group_size`], but trusts the kernel's own reported limit when
/// the backend can provide one.
pub fn max_group_size_for_kernel<K: KernelQuery + ?Sized>(
    device: &DeviceProfile,
    kernel: &K,
    local_mem_per_item: usize,
    policies: &RegisterPolicies,
) -> usize {
    match kernel.known_max_work_group_size(device) {
        Some(kernel_max) => {
            tracing::debug!(device = %device.name, kernel_max, "using kernel-reported maximum");
            kernel_max.min(device.max_work_group_size).max(1)
        }
        None => max_group_size(device, local_mem_per_item, policies),
    }
}

/// Work-group size a reduction should aim for on `device`.
pub fn preferred_group_size(
    device: &DeviceProfile,
    local_mem_per_item: usize,
    config: &ReductionConfig,
    policies: &RegisterPolicies,
) -> usize {
    let device_max = device.max_work_group_size.max(1);
    match device.device_class {
        DeviceClass::Cpu => config
            .preferred_size(DeviceClass::Cpu)
            .unwrap_or(DEFAULT_CPU_WORK_GROUP_SIZE)
            .min(device_max),
        class @ (DeviceClass::Gpu | DeviceClass::Accelerator) => {
            match config.preferred_size(class) {
                Some(size) => size.min(device_max),
                None => max_group_size(device, local_mem_per_item, policies),
            }
        }
    }
}

/// Estimated number of work-groups that run truly concurrently.
///
/// Callers size their partial-result buffers from this.
pub fn estimate_concurrent_groups(device: Option<&DeviceProfile>) -> u32 {
    let Some(device) = device else {
        return DEFAULT_CONCURRENT_GROUPS;
    };
    if device.is_gpu() && device.host_unified_memory {
        device
            .compute_units
            .saturating_mul(UNIFIED_MEMORY_OVERSUBSCRIPTION)
    } else {
        device.compute_units
    }
}

/// Whether reductions on `device` should launch from a persistent kernel bundle.
pub fn should_use_kernel_bundle(device: Option<&DeviceProfile>, config: &ReductionConfig) -> bool {
    device
        .map(|d| config.kernel_bundles_enabled(&d.backend))
        .unwrap_or(false)
}
