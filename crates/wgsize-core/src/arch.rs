//! Device architecture tags and their capability codes.
//!
//! NVIDIA architectures map to the integer code the device compiler exposes
//! as `__CUDA_ARCH__` (`sm_89` is `890`). AMD `gfx*` targets and the generic
//! target carry no such code.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WgSizeError};

/// NVIDIA streaming-multiprocessor architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CudaArch {
    /// Fermi.
    Sm20,
    /// Fermi.
    Sm21,
    /// Kepler.
    Sm30,
    /// Kepler.
    Sm32,
    /// Kepler.
    Sm35,
    /// Kepler.
    Sm37,
    /// Maxwell.
    Sm50,
    /// Maxwell.
    Sm52,
    /// Maxwell.
    Sm53,
    /// Pascal.
    Sm60,
    /// Pascal.
    Sm61,
    /// Pascal.
    Sm62,
    /// Volta.
    Sm70,
    /// Volta.
    Sm72,
    /// Turing.
    Sm75,
    /// Ampere.
    Sm80,
    /// Ampere.
    Sm86,
    /// Ampere.
    Sm87,
    /// Ada Lovelace.
    Sm89,
    /// Hopper.
    Sm90,
    /// Hopper with architecture-specific features.
    Sm90a,
}

impl CudaArch {
    /// Capability code, e.g. `890` for `sm_89`.
    pub fn code(&self) -> u32 {
        match self {
            CudaArch::Sm20 => 200,
            CudaArch::Sm21 => 210,
            CudaArch::Sm30 => 300,
            CudaArch::Sm32 => 320,
            CudaArch::Sm35 => 350,
            CudaArch::Sm37 => 370,
            CudaArch::Sm50 => 500,
            CudaArch::Sm52 => 520,
            CudaArch::Sm53 => 530,
            CudaArch::Sm60 => 600,
            CudaArch::Sm61 => 610,
            CudaArch::Sm62 => 620,
            CudaArch::Sm70 => 700,
            CudaArch::Sm72 => 720,
            CudaArch::Sm75 => 750,
            CudaArch::Sm80 => 800,
            CudaArch::Sm86 => 860,
            CudaArch::Sm87 => 870,
            CudaArch::Sm89 => 890,
            CudaArch::Sm90 | CudaArch::Sm90a => 900,
        }
    }

    /// Compute capability as (major, minor).
    pub fn compute_capability(&self) -> (u32, u32) {
        let code = self.code();
        (code / 100, (code % 100) / 10)
    }

    /// Whether the architecture enables features that are not forward compatible.
    pub fn has_arch_specific_features(&self) -> bool {
        matches!(self, CudaArch::Sm90a)
    }

    fn tag(&self) -> &'static str {
        match self {
            CudaArch::Sm20 => "sm_20",
            CudaArch::Sm21 => "sm_21",
            CudaArch::Sm30 => "sm_30",
            CudaArch::Sm32 => "sm_32",
            CudaArch::Sm35 => "sm_35",
            CudaArch::Sm37 => "sm_37",
            CudaArch::Sm50 => "sm_50",
            CudaArch::Sm52 => "sm_52",
            CudaArch::Sm53 => "sm_53",
            CudaArch::Sm60 => "sm_60",
            CudaArch::Sm61 => "sm_61",
            CudaArch::Sm62 => "sm_62",
            CudaArch::Sm70 => "sm_70",
            CudaArch::Sm72 => "sm_72",
            CudaArch::Sm75 => "sm_75",
            CudaArch::Sm80 => "sm_80",
            CudaArch::Sm86 => "sm_86",
            CudaArch::Sm87 => "sm_87",
            CudaArch::Sm89 => "sm_89",
            CudaArch::Sm90 => "sm_90",
            CudaArch::Sm90a => "sm_90a",
        }
    }
}

impl fmt::Display for CudaArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CudaArch {
    type Err = WgSizeError;

    fn from_str(s: &str) -> Result<Self> {
        let arch = match s.trim().to_ascii_lowercase().as_str() {
            "sm_20" => CudaArch::Sm20,
            "sm_21" => CudaArch::Sm21,
            "sm_30" => CudaArch::Sm30,
            "sm_32" => CudaArch::Sm32,
            "sm_35" => CudaArch::Sm35,
            "sm_37" => CudaArch::Sm37,
            "sm_50" => CudaArch::Sm50,
            "sm_52" => CudaArch::Sm52,
            "sm_53" => CudaArch::Sm53,
            "sm_60" => CudaArch::Sm60,
            "sm_61" => CudaArch::Sm61,
            "sm_62" => CudaArch::Sm62,
            "sm_70" => CudaArch::Sm70,
            "sm_72" => CudaArch::Sm72,
            "sm_75" => CudaArch::Sm75,
            "sm_80" => CudaArch::Sm80,
            "sm_86" => CudaArch::Sm86,
            "sm_87" => CudaArch::Sm87,
            "sm_89" => CudaArch::Sm89,
            "sm_90" => CudaArch::Sm90,
            "sm_90a" => CudaArch::Sm90a,
            other => {
                return Err(WgSizeError::InvalidDevice(format!(
                    "unknown CUDA architecture '{}'",
                    other
                )))
            }
        };
        Ok(arch)
    }
}

/// Capability code for an architecture tag.
///
/// Returns `None` for AMD `gfx*` targets, `generic`, and unrecognized tags.
pub fn capability_code(tag: &str) -> Option<u32> {
    tag.parse::<CudaArch>().ok().map(|arch| arch.code())
}
