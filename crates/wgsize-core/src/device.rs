//! Device capability snapshots.
//!
//! A [`DeviceProfile`] is a flat, immutable description of everything the
//! resolver needs to know about a device. Real runtimes expose it through
//! [`DeviceQuery`]; tests and the CLI build profiles directly or pick a preset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arch;
use crate::error::{Result, WgSizeError};

/// Coarse category of compute device used to select tuning defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Host CPU device.
    Cpu,
    /// Discrete or integrated GPU.
    Gpu,
    /// FPGA or other accelerator.
    #[serde(alias = "acc")]
    Accelerator,
}

impl DeviceClass {
    /// All device classes, in configuration order.
    pub const ALL: [DeviceClass; 3] = [DeviceClass::Cpu, DeviceClass::Gpu, DeviceClass::Accelerator];

    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Cpu => "cpu",
            DeviceClass::Gpu => "gpu",
            DeviceClass::Accelerator => "accelerator",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceClass {
    type Err = WgSizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(DeviceClass::Cpu),
            "gpu" => Ok(DeviceClass::Gpu),
            "acc" | "accelerator" => Ok(DeviceClass::Accelerator),
            other => Err(WgSizeError::Config(format!(
                "unknown device class '{}' (expected cpu, gpu or acc)",
                other
            ))),
        }
    }
}

/// Identifier of the runtime stack a device is reached through.
///
/// The set is open: any string is accepted and normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct BackendId(String);

impl BackendId {
    /// CUDA-class backend.
    pub const CUDA: &'static str = "cuda";
    /// AMD HIP backend.
    pub const HIP: &'static str = "hip";
    /// oneAPI Level Zero backend.
    pub const LEVEL_ZERO: &'static str = "level_zero";
    /// OpenCL backend.
    pub const OPENCL: &'static str = "opencl";
    /// Native CPU backend.
    pub const NATIVE_CPU: &'static str = "native_cpu";

    /// Create a backend id, normalizing to lowercase.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    /// The CUDA backend id.
    pub fn cuda() -> Self {
        Self::new(Self::CUDA)
    }

    /// The HIP backend id.
    pub fn hip() -> Self {
        Self::new(Self::HIP)
    }

    /// The Level Zero backend id.
    pub fn level_zero() -> Self {
        Self::new(Self::LEVEL_ZERO)
    }

    /// The OpenCL backend id.
    pub fn opencl() -> Self {
        Self::new(Self::OPENCL)
    }

    /// The backend name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BackendId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for BackendId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<BackendId> for String {
    fn from(id: BackendId) -> Self {
        id.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability snapshot of a single device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Human readable device name.
    #[serde(default)]
    pub name: String,
    /// Device class.
    pub device_class: DeviceClass,
    /// Runtime backend.
    pub backend: BackendId,
    /// Maximum work-items per work-group.
    pub max_work_group_size: usize,
    /// Local (shared) memory available to one work-group, in bytes.
    #[serde(default)]
    pub local_mem_bytes: usize,
    /// Number of compute units.
    pub compute_units: u32,
    /// Whether host and device share memory.
    #[serde(default)]
    pub host_unified_memory: bool,
    /// Registers available to one work-group, when the backend reports it.
    #[serde(default)]
    pub max_registers_per_group: Option<u32>,
    /// Architecture tag such as `sm_89` or `gfx90a`.
    #[serde(default)]
    pub arch: Option<String>,
}

impl DeviceProfile {
    /// Create a profile with the mandatory capabilities.
    pub fn new(
        device_class: DeviceClass,
        backend: impl Into<BackendId>,
        max_work_group_size: usize,
        compute_units: u32,
    ) -> Self {
        Self {
            name: String::new(),
            device_class,
            backend: backend.into(),
            max_work_group_size,
            local_mem_bytes: 0,
            compute_units,
            host_unified_memory: false,
            max_registers_per_group: None,
            arch: None,
        }
    }

    /// Builder method to set the device name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder method to set local memory per work-group.
    #[must_use]
    pub fn with_local_mem(mut self, bytes: usize) -> Self {
        self.local_mem_bytes = bytes;
        self
    }

    /// Builder method to set host-unified memory.
    #[must_use]
    pub fn with_unified_memory(mut self, unified: bool) -> Self {
        self.host_unified_memory = unified;
        self
    }

    /// Builder method to set the registers-per-group ceiling.
    #[must_use]
    pub fn with_registers_per_group(mut self, registers: u32) -> Self {
        self.max_registers_per_group = Some(registers);
        self
    }

    /// Builder method to set the architecture tag.
    #[must_use]
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// Returns whether this is a CPU device.
    pub fn is_cpu(&self) -> bool {
        self.device_class == DeviceClass::Cpu
    }

    /// Returns whether this is a GPU device.
    pub fn is_gpu(&self) -> bool {
        self.device_class == DeviceClass::Gpu
    }

    /// Integer capability code for the device architecture, if it has one.
    pub fn capability_code(&self) -> Option<u32> {
        self.arch.as_deref().and_then(arch::capability_code)
    }

    /// Validate the profile.
    pub fn validate(&self) -> Result<()> {
        if self.max_work_group_size == 0 {
            return Err(WgSizeError::InvalidDevice(format!(
                "'{}': max_work_group_size must be greater than 0",
                self.name
            )));
        }
        if self.compute_units == 0 {
            return Err(WgSizeError::InvalidDevice(format!(
                "'{}': compute_units must be greater than 0",
                self.name
            )));
        }
        Ok(())
    }

    /// Host CPU exposed through OpenCL.
    pub fn host_cpu() -> Self {
        Self::new(DeviceClass::Cpu, BackendId::OPENCL, 8192, 16)
            .with_name("host-cpu")
            .with_local_mem(256 * 1024)
            .with_unified_memory(true)
    }

    /// Intel integrated graphics on Level Zero.
    pub fn intel_hd() -> Self {
        Self::new(DeviceClass::Gpu, BackendId::LEVEL_ZERO, 256, 24)
            .with_name("intel-hd")
            .with_local_mem(64 * 1024)
            .with_unified_memory(true)
    }

    /// NVIDIA Ampere (A100-class) GPU.
    pub fn nvidia_ampere() -> Self {
        Self::new(DeviceClass::Gpu, BackendId::CUDA, 1024, 108)
            .with_name("nvidia-ampere")
            .with_local_mem(48 * 1024)
            .with_registers_per_group(65536)
            .with_arch("sm_80")
    }

    /// NVIDIA Ada Lovelace (RTX 40xx) GPU.
    pub fn nvidia_ada() -> Self {
        Self::new(DeviceClass::Gpu, BackendId::CUDA, 1024, 128)
            .with_name("nvidia-ada")
            .with_local_mem(48 * 1024)
            .with_registers_per_group(65536)
            .with_arch("sm_89")
    }

    /// AMD Instinct MI200-class GPU on HIP.
    pub fn amd_mi200() -> Self {
        Self::new(DeviceClass::Gpu, BackendId::HIP, 1024, 110)
            .with_name("amd-mi200")
            .with_local_mem(64 * 1024)
            .with_arch("gfx90a")
    }

    /// FPGA emulation device.
    pub fn fpga_emulator() -> Self {
        Self::new(DeviceClass::Accelerator, BackendId::OPENCL, 8192, 4)
            .with_name("fpga-emulator")
            .with_local_mem(256 * 1024)
    }

    /// Names of the built-in presets.
    pub const PRESETS: [&'static str; 6] = [
        "host-cpu",
        "intel-hd",
        "nvidia-ampere",
        "nvidia-ada",
        "amd-mi200",
        "fpga-emulator",
    ];

    /// Look up a built-in preset by name.
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "host-cpu" => Ok(Self::host_cpu()),
            "intel-hd" => Ok(Self::intel_hd()),
            "nvidia-ampere" => Ok(Self::nvidia_ampere()),
            "nvidia-ada" => Ok(Self::nvidia_ada()),
            "amd-mi200" => Ok(Self::amd_mi200()),
            "fpga-emulator" => Ok(Self::fpga_emulator()),
            other => Err(WgSizeError::UnknownPreset(other.to_string())),
        }
    }
}

/// Source of device capability snapshots.
///
/// Implemented by whatever owns the real device connection.
pub trait DeviceQuery {
    /// Returns a capability snapshot of the device.
    fn profile(&self) -> DeviceProfile;
}

impl DeviceQuery for DeviceProfile {
    fn profile(&self) -> DeviceProfile {
        self.clone()
    }
}
