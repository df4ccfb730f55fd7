//! Configuration management for the scheduler.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Environment variable overrides
//! - Configuration file support
//! - Component-wise validation
mod instance;
mod storage;

pub use instance::*;
pub use storage::*;


//---
use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Main configuration container for the scheduler.
///
/// Configuration sources are merged in the following order (later sources
/// override earlier ones):
/// 1. Type defaults (lowest priority)
/// 2. Configuration file from `CONFIG_PATH` environment variable
/// 3. Environment variables with `BUILDMILL__` prefix (highest priority)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SchedulerConfig {
    /// Lifecycle timeouts and pagination caps
    pub instance: InstanceConfig,
    /// Content-addressable storage binding
    pub cas: CasConfig,
    /// Action cache binding
    pub action_cache: ActionCacheConfig,
}

impl SchedulerConfig {
    /// Loads the merged configuration.
    ///
    /// # Example
    /// ```ignore
    /// std::env::set_var("CONFIG_PATH", "config/scheduler.toml");
    /// std::env::set_var("BUILDMILL__INSTANCE__OPERATION_POLL_TIMEOUT_MS", "5000");
    /// let cfg = SchedulerConfig::new()?;
    /// ```
    pub fn new() -> Result<Self> {
        // 1. Default values as the base layer
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        // 2. Conditionally add configuration files
        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path));
        }

        // 3. Add environment variable source
        builder = builder.add_source(
            Environment::with_prefix("BUILDMILL")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies a runtime override file on top of the current values, then a
    /// fresh environment pass.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("BUILDMILL")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validates cross-component configuration rules
    pub fn validate(&self) -> Result<()> {
        self.instance.validate()?;
        self.cas.validate()?;
        self.action_cache.validate()?;
        Ok(())
    }
}
