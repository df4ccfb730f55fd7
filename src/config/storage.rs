use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Content-addressable storage binding.
///
/// Remote CAS backends are supplied by callers through the
/// [`ContentAddressableStorage`](crate::cas::ContentAddressableStorage)
/// trait; the configuration only parameterises the in-process binding.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CasConfig {
    Memory {
        #[serde(default = "default_cas_capacity")]
        max_size_bytes: u64,
    },
}

impl Default for CasConfig {
    fn default() -> Self {
        CasConfig::Memory {
            max_size_bytes: default_cas_capacity(),
        }
    }
}

impl CasConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            CasConfig::Memory { max_size_bytes } => {
                if *max_size_bytes == 0 {
                    return Err(
                        ConfigError::Message("cas max_size_bytes cannot be 0".into()).into()
                    );
                }
            }
        }
        Ok(())
    }
}

/// Action cache binding: in-process through the CAS, or a remote gRPC cache.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionCacheConfig {
    #[default]
    DelegateCas,
    Grpc {
        /// e.g. `http://cache.internal:8980`
        target: String,
        instance_name: String,
    },
}

impl ActionCacheConfig {
    pub fn validate(&self) -> Result<()> {
        if let ActionCacheConfig::Grpc { target, .. } = self {
            if target.is_empty() {
                return Err(
                    ConfigError::Message("action_cache grpc target cannot be empty".into()).into(),
                );
            }
        }
        Ok(())
    }
}

fn default_cas_capacity() -> u64 {
    // 1 GiB
    1 << 30
}
