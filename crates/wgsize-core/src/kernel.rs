//! Kernel capability queries.
//!
//! Backends that can compile ahead of launch report the largest work-group a
//! compiled kernel supports on a given device. Backends without that query
//! answer `0`.

use crate::device::DeviceProfile;

/// Value returned by a backend that cannot report a kernel's maximum.
pub const UNKNOWN_WORK_GROUP_SIZE: usize = 0;

/// Source of kernel-specific launch limits.
pub trait KernelQuery {
    /// Maximum work-group size of this kernel on `device`, or
    /// [`UNKNOWN_WORK_GROUP_SIZE`] when the backend lacks the query.
    fn max_work_group_size(&self, device: &DeviceProfile) -> usize;

    /// Same as [`KernelQuery::max_work_group_size`] with the sentinel mapped to `None`.
    fn known_max_work_group_size(&self, device: &DeviceProfile) -> Option<usize> {
        match self.max_work_group_size(device) {
            UNKNOWN_WORK_GROUP_SIZE => None,
            n => Some(n),
        }
    }
}

/// Static kernel description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelInfo {
    /// Kernel name.
    pub name: String,
    /// Reported maximum work-group size (0 when unknown).
    pub max_work_group_size: usize,
}

impl KernelInfo {
    /// Create a kernel description with a known maximum.
    pub fn new(name: impl Into<String>, max_work_group_size: usize) -> Self {
        Self {
            name: name.into(),
            max_work_group_size,
        }
    }

    /// Create a kernel description whose backend cannot report a maximum.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::new(name, UNKNOWN_WORK_GROUP_SIZE)
    }
}

impl KernelQuery for KernelInfo {
    fn max_work_group_size(&self, _device: &DeviceProfile) -> usize {
        self.max_work_group_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_maps_to_none() {
        let device = DeviceProfile::intel_hd();
        assert_eq!(
            KernelInfo::unknown("reduce").known_max_work_group_size(&device),
            None
        );
        assert_eq!(
            KernelInfo::new("reduce", 128).known_max_work_group_size(&device),
            Some(128)
        );
    }
}
