//! Launch geometry resolution for reductions.
//!
//! The free functions in this module are pure: they read a device snapshot,
//! a request and the configuration, and always produce an answer.
//! [`GeometryResolver`] bundles the configuration and register policies so a
//! runtime can hold one value and share it across threads.
//!
//! # Example
//!
//! ```ignore
//! use wgsize_core::prelude::*;
//!
//! let resolver = GeometryResolver::new(ReductionConfig::default());
//! let request = LaunchRequest::new(1_000_000, 8)?;
//! let plan = resolver.plan(Some(&DeviceProfile::intel_hd()), &request)?;
//! println!("{} groups of {}", plan.geometry.work_group_count, plan.geometry.work_group_size);
//! ```

mod distribute;
mod limits;

use std::sync::Arc;

use serde::Serialize;

use crate::config::ReductionConfig;
use crate::device::{DeviceProfile, DeviceQuery};
use crate::error::{Result, WgSizeError};
use crate::kernel::{KernelQuery, UNKNOWN_WORK_GROUP_SIZE};
use crate::registers::{prev_power_of_two, RegisterPolicies};

pub use distribute::compute_group_size;
pub use limits::{
    estimate_concurrent_groups, max_group_size, max_group_size_for_kernel, preferred_group_size,
    should_use_kernel_bundle, DEFAULT_CONCURRENT_GROUPS, DEFAULT_CPU_WORK_GROUP_SIZE,
    UNIFIED_MEMORY_OVERSUBSCRIPTION,
};

/// Work to be sized for a single reduction launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchRequest {
    total_work_items: usize,
    local_mem_per_item: usize,
    kernel_max_work_group_size: Option<usize>,
}

impl LaunchRequest {
    /// Create a request for `total_work_items` work-items, each needing
    /// `local_mem_per_item` bytes of local memory.
    pub fn new(total_work_items: usize, local_mem_per_item: usize) -> Result<Self> {
        if total_work_items == 0 {
            return Err(WgSizeError::InvalidRequest(
                "total_work_items must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            total_work_items,
            local_mem_per_item,
            kernel_max_work_group_size: None,
        })
    }

    /// Builder method to set the compiled kernel's maximum work-group size.
    ///
    /// `0` means the kernel could not report one.
    #[must_use]
    pub fn with_kernel_max(mut self, max_work_group_size: usize) -> Self {
        self.kernel_max_work_group_size = Some(max_work_group_size).filter(|&n| n > 0);
        self
    }

    /// Builder method to take the kernel maximum from a kernel query.
    #[must_use]
    pub fn with_kernel<K: KernelQuery + ?Sized>(self, kernel: &K, device: &DeviceProfile) -> Self {
        self.with_kernel_max(kernel.max_work_group_size(device))
    }

    /// Total number of work-items.
    pub fn total_work_items(&self) -> usize {
        self.total_work_items
    }

    /// Local memory per work-item in bytes.
    pub fn local_mem_per_item(&self) -> usize {
        self.local_mem_per_item
    }

    /// Kernel-reported maximum work-group size, if known.
    pub fn kernel_max_work_group_size(&self) -> Option<usize> {
        self.kernel_max_work_group_size
    }
}

impl KernelQuery for LaunchRequest {
    fn max_work_group_size(&self, _device: &DeviceProfile) -> usize {
        self.kernel_max_work_group_size
            .unwrap_or(UNKNOWN_WORK_GROUP_SIZE)
    }
}

/// Work-group size and count for one launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LaunchGeometry {
    /// Work-items per work-group.
    pub work_group_size: usize,
    /// Number of work-groups.
    pub work_group_count: usize,
}

impl LaunchGeometry {
    /// Create a geometry.
    pub fn new(work_group_size: usize, work_group_count: usize) -> Self {
        Self {
            work_group_size,
            work_group_count,
        }
    }

    /// Total work-items launched, including padding in the last group.
    ///
    /// Saturates at `usize::MAX` for ranges close to the address-space limit.
    pub fn global_size(&self) -> usize {
        self.work_group_size.saturating_mul(self.work_group_count)
    }

    /// Number of real work-items in the last group for a range of `total_work_items`.
    pub fn last_group_size(&self, total_work_items: usize) -> usize {
        let full = self
            .work_group_size
            .saturating_mul(self.work_group_count.saturating_sub(1));
        total_work_items.saturating_sub(full)
    }

    /// Whether every group, including the last, is full.
    pub fn is_uniform(&self, total_work_items: usize) -> bool {
        self.work_group_size > 0
            && total_work_items % self.work_group_size == 0
            && self.work_group_count == total_work_items / self.work_group_size
    }

    /// Whether this geometry covers `total_work_items` with no spare group.
    pub fn covers(&self, total_work_items: usize) -> bool {
        self.work_group_size > 0
            && self.work_group_count == total_work_items.div_ceil(self.work_group_size)
    }
}

/// Everything a launch call needs to size a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    /// Chosen work-group size and count.
    pub geometry: LaunchGeometry,
    /// Upper bound the geometry was computed against.
    pub max_work_group_size: usize,
    /// Estimated number of concurrently running work-groups.
    pub concurrent_groups: u32,
    /// Whether to launch from a persistent kernel bundle.
    pub use_kernel_bundle: bool,
}

/// Resolver holding the configuration and register policies.
#[derive(Debug, Clone)]
pub struct GeometryResolver {
    config: Arc<ReductionConfig>,
    policies: Arc<RegisterPolicies>,
}

impl GeometryResolver {
    /// Create a resolver with the default register policies.
    pub fn new(config: impl Into<Arc<ReductionConfig>>) -> Self {
        Self {
            config: config.into(),
            policies: Arc::new(RegisterPolicies::default()),
        }
    }

    /// Builder method to replace the register policies.
    #[must_use]
    pub fn with_policies(mut self, policies: RegisterPolicies) -> Self {
        self.policies = Arc::new(policies);
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &ReductionConfig {
        &self.config
    }

    /// The register policies in use.
    pub fn policies(&self) -> &RegisterPolicies {
        &self.policies
    }

    /// See [`max_group_size`].
    pub fn max_group_size(&self, device: &DeviceProfile, local_mem_per_item: usize) -> usize {
        max_group_size(device, local_mem_per_item, &self.policies)
    }

    /// See [`max_group_size_for_kernel`].
    pub fn max_group_size_for_kernel<K: KernelQuery + ?Sized>(
        &self,
        device: &DeviceProfile,
        kernel: &K,
        local_mem_per_item: usize,
    ) -> usize {
        max_group_size_for_kernel(device, kernel, local_mem_per_item, &self.policies)
    }

    /// See [`preferred_group_size`].
    pub fn preferred_group_size(&self, device: &DeviceProfile, local_mem_per_item: usize) -> usize {
        preferred_group_size(device, local_mem_per_item, &self.config, &self.policies)
    }

    /// See [`estimate_concurrent_groups`].
    pub fn estimate_concurrent_groups(&self, device: Option<&DeviceProfile>) -> u32 {
        estimate_concurrent_groups(device)
    }

    /// See [`should_use_kernel_bundle`].
    pub fn should_use_kernel_bundle(&self, device: Option<&DeviceProfile>) -> bool {
        should_use_kernel_bundle(device, &self.config)
    }

    /// Upper bound on the work-group size for `request` on `device`.
    ///
    /// CPU devices and configured overrides use the preferred size. Otherwise
    /// a kernel-reported maximum replaces the device heuristic. The result is
    /// capped by the kernel's own limit and rounded down to a power of two on
    /// backends that need one.
    pub fn group_size_limit(&self, device: &DeviceProfile, request: &LaunchRequest) -> usize {
        let local = request.local_mem_per_item;
        let mut limit = match self.config.preferred_size(device.device_class) {
            None if !device.is_cpu() => self.max_group_size_for_kernel(device, request, local),
            _ => self.preferred_group_size(device, local),
        };
        if let Some(kernel_max) = request.kernel_max_work_group_size {
            limit = limit.min(kernel_max);
        }
        limit = limit.min(device.max_work_group_size).max(1);
        if self.policies.requires_power_of_two(&device.backend) {
            limit = prev_power_of_two(limit);
        }
        limit
    }

    /// Work-group size and count for `request` on `device`.
    pub fn geometry(&self, device: &DeviceProfile, request: &LaunchRequest) -> LaunchGeometry {
        let limit = self.group_size_limit(device, request);
        let total = request.total_work_items;
        let geometry = compute_group_size(total, limit);

        if self.policies.requires_power_of_two(&device.backend)
            && !geometry.work_group_size.is_power_of_two()
        {
            let size = limit.min(total.next_power_of_two());
            let rounded = LaunchGeometry::new(size, total.div_ceil(size));
            tracing::debug!(
                backend = %device.backend,
                from = geometry.work_group_size,
                to = size,
                "rounded work-group size to a power of two"
            );
            return rounded;
        }
        geometry
    }

    /// Full launch plan for `request` on the device behind `query`.
    pub fn plan_for(&self, query: &dyn DeviceQuery, request: &LaunchRequest) -> Result<LaunchPlan> {
        self.plan(Some(&query.profile()), request)
    }

    /// Full launch plan for `request`.
    ///
    /// Fails when no device is bound, since there is no device-independent
    /// work-group size.
    pub fn plan(&self, device: Option<&DeviceProfile>, request: &LaunchRequest) -> Result<LaunchPlan> {
        let device = device.ok_or(WgSizeError::MissingDevice)?;
        device.validate()?;

        let plan = LaunchPlan {
            geometry: self.geometry(device, request),
            max_work_group_size: self.group_size_limit(device, request),
            concurrent_groups: self.estimate_concurrent_groups(Some(device)),
            use_kernel_bundle: self.should_use_kernel_bundle(Some(device)),
        };
        tracing::info!(
            device = %device.name,
            total_work_items = request.total_work_items,
            work_group_size = plan.geometry.work_group_size,
            work_group_count = plan.geometry.work_group_count,
            concurrent_groups = plan.concurrent_groups,
            "planned reduction launch"
        );
        Ok(plan)
    }
}

impl Default for GeometryResolver {
    fn default() -> Self {
        Self::new(ReductionConfig::default())
    }
}
