//! Reduction tuning overrides.
//!
//! [`ReductionConfig`] is built once, at startup, and then passed by
//! reference to the resolver. It can be loaded from TOML files and
//! `WGSIZE__*` environment variables through the `config` crate, or from the
//! compact single-variable forms:
//!
//! ```text
//! WGSIZE_REDUCTION_PREFERRED_WORKGROUP_SIZE=cpu:32,gpu:256,acc:64
//! WGSIZE_REDUCTION_ENABLE_USE_KERNEL_BUNDLES=cuda:1,hip:0
//! ```
//!
//! # Example
//!
//! ```ignore
//! use wgsize_core::config::ReductionConfig;
//!
//! let config = ReductionConfig::load("wgsize.toml")?.apply_compact_env()?;
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::device::{BackendId, DeviceClass};
use crate::error::{Result, WgSizeError};

/// Environment prefix for layered configuration.
pub const ENV_PREFIX: &str = "WGSIZE";

/// Compact variable holding preferred work-group sizes per device class.
pub const PREFERRED_WORKGROUP_SIZE_VAR: &str = "WGSIZE_REDUCTION_PREFERRED_WORKGROUP_SIZE";

/// Compact variable holding kernel-bundle flags per backend.
pub const KERNEL_BUNDLES_VAR: &str = "WGSIZE_REDUCTION_ENABLE_USE_KERNEL_BUNDLES";

/// Preferred work-group size override per device class.
///
/// `None` and `Some(0)` both mean "no override".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferredSizes {
    /// Override for CPU devices.
    #[serde(default)]
    pub cpu: Option<usize>,
    /// Override for GPU devices.
    #[serde(default)]
    pub gpu: Option<usize>,
    /// Override for accelerators.
    #[serde(default, alias = "acc")]
    pub accelerator: Option<usize>,
}

impl PreferredSizes {
    /// Override for `class`, if one is set.
    pub fn get(&self, class: DeviceClass) -> Option<usize> {
        let value = match class {
            DeviceClass::Cpu => self.cpu,
            DeviceClass::Gpu => self.gpu,
            DeviceClass::Accelerator => self.accelerator,
        };
        value.filter(|&size| size > 0)
    }

    /// Set the override for `class`.
    pub fn set(&mut self, class: DeviceClass, size: Option<usize>) {
        match class {
            DeviceClass::Cpu => self.cpu = size,
            DeviceClass::Gpu => self.gpu = size,
            DeviceClass::Accelerator => self.accelerator = size,
        }
    }
}

/// Process-wide reduction tuning overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionConfig {
    /// Preferred work-group size per device class.
    #[serde(default)]
    pub preferred_work_group_size: PreferredSizes,

    /// Whether reductions should launch from a persistent kernel bundle, per backend.
    #[serde(default)]
    pub kernel_bundles: BTreeMap<BackendId, bool>,
}

impl ReductionConfig {
    /// Load configuration from a file, layered with `WGSIZE__*` variables.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %path.as_ref().display(),
                    error = %e,
                    "falling back to default reduction config"
                );
                Self::default()
            }
        }
    }

    /// Create from `WGSIZE__*` environment variables only.
    pub fn from_env() -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the compact environment variables on top of this configuration.
    pub fn apply_compact_env(self) -> Result<Self> {
        let preferred = std::env::var(PREFERRED_WORKGROUP_SIZE_VAR).ok();
        let bundles = std::env::var(KERNEL_BUNDLES_VAR).ok();
        self.apply_compact(preferred.as_deref(), bundles.as_deref())
    }

    /// Create from the compact environment variables only.
    pub fn from_compact_env() -> Result<Self> {
        Self::default().apply_compact_env()
    }

    /// Apply compact `class:size,...` and `backend:flag,...` strings.
    pub fn apply_compact(mut self, preferred: Option<&str>, bundles: Option<&str>) -> Result<Self> {
        if let Some(spec) = preferred {
            for (class, size) in parse_preferred_sizes(spec)? {
                self.preferred_work_group_size.set(class, Some(size));
            }
        }
        if let Some(spec) = bundles {
            for (backend, enabled) in parse_kernel_bundles(spec)? {
                self.kernel_bundles.insert(backend, enabled);
            }
        }
        self.validate()?;
        Ok(self)
    }

    /// Preferred work-group size override for `class`.
    pub fn preferred_size(&self, class: DeviceClass) -> Option<usize> {
        self.preferred_work_group_size.get(class)
    }

    /// Whether kernel bundles are enabled for `backend`.
    pub fn kernel_bundles_enabled(&self, backend: &BackendId) -> bool {
        self.kernel_bundles.get(backend).copied().unwrap_or(false)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.kernel_bundles.keys().any(|b| b.as_str().is_empty()) {
            return Err(WgSizeError::Config(
                "kernel_bundles contains an empty backend name".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from a TOML string.
pub fn load_config_from_str(content: &str) -> Result<ReductionConfig> {
    let config: ReductionConfig = Config::builder()
        .add_source(File::from_str(content, FileFormat::Toml))
        .build()?
        .try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Parse `cpu:32,gpu:256,acc:64`.
pub fn parse_preferred_sizes(spec: &str) -> Result<Vec<(DeviceClass, usize)>> {
    split_pairs(spec)?
        .into_iter()
        .map(|(key, value)| {
            let class: DeviceClass = key.parse()?;
            let size = value.parse::<usize>().map_err(|_| {
                WgSizeError::Config(format!(
                    "invalid work-group size '{}' for device class '{}'",
                    value, key
                ))
            })?;
            Ok((class, size))
        })
        .collect()
}

/// Parse `cuda:1,hip:0`.
pub fn parse_kernel_bundles(spec: &str) -> Result<Vec<(BackendId, bool)>> {
    split_pairs(spec)?
        .into_iter()
        .map(|(key, value)| {
            let enabled = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "on" => true,
                "0" | "false" | "off" => false,
                other => {
                    return Err(WgSizeError::Config(format!(
                        "invalid kernel bundle flag '{}' for backend '{}'",
                        other, key
                    )))
                }
            };
            Ok((BackendId::new(key), enabled))
        })
        .collect()
}

fn split_pairs(spec: &str) -> Result<Vec<(&str, &str)>> {
    spec.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
            _ => Err(WgSizeError::Config(format!(
                "malformed entry '{}' (expected key:value)",
                entry
            ))),
        })
        .collect()
}

/// Configuration builder for programmatic configuration.
pub struct ConfigBuilder {
    config: ReductionConfig,
}

impl ConfigBuilder {
    /// Create a new builder with no overrides.
    pub fn new() -> Self {
        Self {
            config: ReductionConfig::default(),
        }
    }

    /// Set the preferred work-group size for a device class.
    pub fn preferred_size(mut self, class: DeviceClass, size: usize) -> Self {
        self.config.preferred_work_group_size.set(class, Some(size));
        self
    }

    /// Enable or disable kernel bundles for a backend.
    pub fn kernel_bundles(mut self, backend: impl Into<BackendId>, enabled: bool) -> Self {
        self.config.kernel_bundles.insert(backend.into(), enabled);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<ReductionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
