//! # wgsize-core
//!
//! Launch geometry for data-parallel reductions: how many work-items form a
//! work-group and how many work-groups to launch.
//!
//! The resolver balances the device's maximum work-group size, the local
//! memory each work-item needs, backend register limits, and device-class
//! tuning (CPU, GPU, accelerator). Device and kernel capabilities come in as
//! plain snapshots; tuning overrides come in as an explicit
//! [`ReductionConfig`](config::ReductionConfig).
//!
//! ## Example
//!
//! ```
//! use wgsize_core::prelude::*;
//!
//! let resolver = GeometryResolver::new(ReductionConfig::default());
//! let device = DeviceProfile::intel_hd();
//! let request = LaunchRequest::new(160, 0).unwrap();
//!
//! let plan = resolver.plan(Some(&device), &request).unwrap();
//! assert_eq!(plan.geometry.work_group_size, 160);
//! assert_eq!(plan.geometry.work_group_count, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arch;
pub mod config;
pub mod device;
pub mod error;
pub mod kernel;
pub mod occupancy;
pub mod registers;
pub mod resolver;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::arch::{capability_code, CudaArch};
    pub use crate::config::{ConfigBuilder, PreferredSizes, ReductionConfig};
    pub use crate::device::{BackendId, DeviceClass, DeviceProfile, DeviceQuery};
    pub use crate::error::{Result, WgSizeError};
    pub use crate::kernel::{KernelInfo, KernelQuery, UNKNOWN_WORK_GROUP_SIZE};
    pub use crate::occupancy::recommended_groups_per_compute_unit;
    pub use crate::registers::{CudaRegisterBudget, RegisterPolicies, RegisterPressurePolicy};
    pub use crate::resolver::{
        compute_group_size, estimate_concurrent_groups, max_group_size,
        max_group_size_for_kernel, preferred_group_size, should_use_kernel_bundle,
        GeometryResolver, LaunchGeometry, LaunchPlan, LaunchRequest,
    };
}

pub use error::{Result, WgSizeError};
pub use resolver::{GeometryResolver, LaunchGeometry, LaunchPlan, LaunchRequest};
