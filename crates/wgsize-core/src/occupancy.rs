//! Work-group occupancy estimates.

use crate::device::DeviceProfile;

/// Recommended number of work-groups resident on one compute unit for
/// groups of `work_group_size` work-items using `local_mem_bytes` of local
/// memory per group.
///
/// Returns 0 when such a group cannot be launched at all: it is larger than
/// the device allows, or its local memory claims the entire capacity and
/// leaves nothing for barriers and builtins.
pub fn recommended_groups_per_compute_unit(
    device: &DeviceProfile,
    work_group_size: usize,
    local_mem_bytes: usize,
) -> usize {
    if work_group_size == 0 || work_group_size > device.max_work_group_size {
        return 0;
    }
    if local_mem_bytes > 0 && local_mem_bytes >= device.local_mem_bytes {
        return 0;
    }

    let by_threads = device.max_work_group_size / work_group_size;
    let by_memory = match local_mem_bytes {
        0 => usize::MAX,
        bytes => device.local_mem_bytes / bytes,
    };
    by_threads.min(by_memory).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_limits_has_resident_groups() {
        let device = DeviceProfile::nvidia_ampere();
        let size = device.max_work_group_size / 2;
        let local = (size / 2) * std::mem::size_of::<f32>();
        assert!(recommended_groups_per_compute_unit(&device, size, local) > 0);
    }

    #[test]
    fn test_maxed_out_has_no_resident_groups() {
        let device = DeviceProfile::nvidia_ampere();
        assert_eq!(
            recommended_groups_per_compute_unit(
                &device,
                device.max_work_group_size,
                device.local_mem_bytes
            ),
            0
        );
    }

    #[test]
    fn test_oversized_group() {
        let device = DeviceProfile::intel_hd();
        assert_eq!(recommended_groups_per_compute_unit(&device, 512, 0), 0);
        assert_eq!(recommended_groups_per_compute_unit(&device, 0, 0), 0);
    }

    #[test]
    fn test_limited_by_threads_or_memory() {
        let device = DeviceProfile::intel_hd(); // 256 max, 64 KiB
        assert_eq!(recommended_groups_per_compute_unit(&device, 64, 0), 4);
        assert_eq!(recommended_groups_per_compute_unit(&device, 64, 32 * 1024), 2);
        assert_eq!(recommended_groups_per_compute_unit(&device, 16, 4096), 16);
        assert_eq!(recommended_groups_per_compute_unit(&device, 256, 1024), 1);
    }
}
