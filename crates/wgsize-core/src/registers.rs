//! Register-pressure limits on work-group size.
//!
//! Some backends fail a launch outright when a work-group needs more
//! registers than the device can provide. Without a way to query a kernel's
//! real register usage, the only safe answer is a pessimistic one: assume
//! every work-item uses the per-thread maximum. Each backend with such a
//! limit gets a [`RegisterPressurePolicy`]; [`RegisterPolicies`] maps backend
//! ids to policies so the rule can be swapped out once kernels report their
//! resource usage.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::device::{BackendId, DeviceProfile};

/// Largest power of two `<= n`, or 0 when `n == 0`.
pub(crate) fn prev_power_of_two(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - n.leading_zeros())
    }
}

/// Backend-specific ceiling on work-group size.
pub trait RegisterPressurePolicy: Send + Sync + fmt::Debug {
    /// Shrink `candidate` until a work-group of that size is launchable on `device`.
    ///
    /// Must return a value in `1..=candidate.max(1)`.
    fn clamp(&self, device: &DeviceProfile, candidate: usize) -> usize;

    /// Whether work-group sizes on this backend must be powers of two.
    fn requires_power_of_two(&self) -> bool;
}

/// CUDA-class budget: every work-item may use up to 255 32-bit registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CudaRegisterBudget {
    /// Registers assumed per work-item.
    pub registers_per_work_item: u32,
}

impl CudaRegisterBudget {
    /// Maximum 32-bit registers a CUDA thread can address.
    pub const MAX_REGISTERS_PER_THREAD: u32 = 255;
}

impl Default for CudaRegisterBudget {
    fn default() -> Self {
        Self {
            registers_per_work_item: Self::MAX_REGISTERS_PER_THREAD,
        }
    }
}

impl RegisterPressurePolicy for CudaRegisterBudget {
    fn clamp(&self, device: &DeviceProfile, candidate: usize) -> usize {
        let register_bound = match device.max_registers_per_group {
            Some(registers) => registers as usize / self.registers_per_work_item.max(1) as usize,
            None => candidate,
        };
        prev_power_of_two(candidate.min(register_bound)).max(1)
    }

    fn requires_power_of_two(&self) -> bool {
        true
    }
}

/// Register-pressure policies keyed by backend.
#[derive(Debug, Clone)]
pub struct RegisterPolicies {
    policies: HashMap<BackendId, Arc<dyn RegisterPressurePolicy>>,
}

impl RegisterPolicies {
    /// Registry with no policies at all.
    pub fn empty() -> Self {
        Self {
            policies: HashMap::new(),
        }
    }

    /// Register `policy` for `backend`, replacing any previous one.
    pub fn insert(
        &mut self,
        backend: impl Into<BackendId>,
        policy: Arc<dyn RegisterPressurePolicy>,
    ) -> Option<Arc<dyn RegisterPressurePolicy>> {
        self.policies.insert(backend.into(), policy)
    }

    /// Builder form of [`RegisterPolicies::insert`].
    #[must_use]
    pub fn with(mut self, backend: impl Into<BackendId>, policy: Arc<dyn RegisterPressurePolicy>) -> Self {
        self.insert(backend, policy);
        self
    }

    /// Remove the policy for `backend`.
    pub fn remove(&mut self, backend: &BackendId) -> Option<Arc<dyn RegisterPressurePolicy>> {
        self.policies.remove(backend)
    }

    /// Policy for `backend`, if any.
    pub fn get(&self, backend: &BackendId) -> Option<&dyn RegisterPressurePolicy> {
        self.policies.get(backend).map(|p| p.as_ref())
    }

    /// Whether `backend` requires power-of-two work-groups.
    pub fn requires_power_of_two(&self, backend: &BackendId) -> bool {
        self.get(backend)
            .map(|p| p.requires_power_of_two())
            .unwrap_or(false)
    }
}

impl Default for RegisterPolicies {
    fn default() -> Self {
        Self::empty().with(BackendId::cuda(), Arc::new(CudaRegisterBudget::default()))
    }
}
