use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Lifecycle timeouts and pagination caps for one scheduler instance.
///
/// Durations are carried as milliseconds; `0` disables the corresponding
/// bound where a field documents that.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InstanceConfig {
    /// Reject actions whose timeout exceeds this. 0 = unlimited.
    #[serde(default = "default_maximum_action_timeout")]
    pub maximum_action_timeout_ms: u64,

    /// Assumed action timeout when the action omits one. 0 = none, in which
    /// case no completion watchdog is installed.
    #[serde(default = "default_action_timeout")]
    pub default_action_timeout_ms: u64,

    /// Inactivity window of the requeue watchdog. A worker that stops
    /// polling for this long loses the operation.
    #[serde(default = "default_operation_poll_timeout")]
    pub operation_poll_timeout_ms: u64,

    /// Grace added to the action timeout before a dispatched operation is
    /// expired with a deadline failure.
    #[serde(default = "default_operation_completed_delay")]
    pub operation_completed_delay_ms: u64,

    #[serde(default = "default_page_size")]
    pub list_operations_default_page_size: u32,

    #[serde(default = "default_max_page_size")]
    pub list_operations_max_page_size: u32,

    #[serde(default = "default_page_size")]
    pub tree_default_page_size: u32,

    #[serde(default = "default_max_page_size")]
    pub tree_max_page_size: u32,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            maximum_action_timeout_ms: default_maximum_action_timeout(),
            default_action_timeout_ms: default_action_timeout(),
            operation_poll_timeout_ms: default_operation_poll_timeout(),
            operation_completed_delay_ms: default_operation_completed_delay(),
            list_operations_default_page_size: default_page_size(),
            list_operations_max_page_size: default_max_page_size(),
            tree_default_page_size: default_page_size(),
            tree_max_page_size: default_max_page_size(),
        }
    }
}

impl InstanceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.operation_poll_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "operation_poll_timeout_ms cannot be 0".into(),
            )
            .into());
        }

        if self.maximum_action_timeout_ms != 0
            && self.default_action_timeout_ms > self.maximum_action_timeout_ms
        {
            return Err(ConfigError::Message(format!(
                "default_action_timeout_ms {}ms exceeds maximum_action_timeout_ms {}ms",
                self.default_action_timeout_ms, self.maximum_action_timeout_ms
            ))
            .into());
        }

        validate_page_sizes(
            "list_operations",
            self.list_operations_default_page_size,
            self.list_operations_max_page_size,
        )?;
        validate_page_sizes("tree", self.tree_default_page_size, self.tree_max_page_size)?;

        Ok(())
    }
}

fn validate_page_sizes(
    prefix: &str,
    default: u32,
    max: u32,
) -> Result<()> {
    if default == 0 {
        return Err(ConfigError::Message(format!("{prefix}_default_page_size must be > 0")).into());
    }
    if default > max {
        return Err(ConfigError::Message(format!(
            "{prefix}_default_page_size {default} exceeds {prefix}_max_page_size {max}"
        ))
        .into());
    }
    Ok(())
}

fn default_maximum_action_timeout() -> u64 {
    600_000
}
fn default_action_timeout() -> u64 {
    60_000
}
fn default_operation_poll_timeout() -> u64 {
    30_000
}
fn default_operation_completed_delay() -> u64 {
    10_000
}
fn default_page_size() -> u32 {
    1024
}
fn default_max_page_size() -> u32 {
    16384
}
