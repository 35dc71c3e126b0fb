use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{
    CountPolicy, DeadlinePolicy, ExhaustionPolicy, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT,
};
use crate::error::ExecutorError;

/// Serialized form of an [`ExhaustionPolicy`].
///
/// Numeric fields are signed so that negative input reaches validation and is
/// reported as a configuration error rather than a parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    Count {
        #[serde(default)]
        max_retries: i64,
        #[serde(default)]
        retry_delay_ms: i64,
    },
    Deadline {
        #[serde(default = "default_timeout_ms")]
        timeout_ms: i64,
        #[serde(default = "default_poll_interval_ms")]
        poll_interval_ms: i64,
    },
}

fn default_timeout_ms() -> i64 {
    DEFAULT_TIMEOUT.as_millis() as i64
}

fn default_poll_interval_ms() -> i64 {
    DEFAULT_POLL_INTERVAL.as_millis() as i64
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig::Deadline {
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl PolicyConfig {
    pub fn from_json(input: &str) -> Result<Self, ExecutorError> {
        serde_json::from_str(input)
            .map_err(|e| ExecutorError::InvalidConfiguration(format!("malformed policy: {}", e)))
    }

    pub fn to_json(&self) -> Result<String, ExecutorError> {
        serde_json::to_string(self).map_err(|e| ExecutorError::InvalidConfiguration(e.to_string()))
    }
}

fn non_negative(name: &str, value: i64) -> Result<u64, ExecutorError> {
    u64::try_from(value).map_err(|_| {
        ExecutorError::InvalidConfiguration(format!("{} must not be negative, got {}", name, value))
    })
}

impl TryFrom<PolicyConfig> for ExhaustionPolicy {
    type Error = ExecutorError;

    fn try_from(config: PolicyConfig) -> Result<Self, Self::Error> {
        let policy = match config {
            PolicyConfig::Count {
                max_retries,
                retry_delay_ms,
            } => {
                let max_retries = non_negative("max_retries", max_retries)?;
                let retry_delay_ms = non_negative("retry_delay_ms", retry_delay_ms)?;
                ExhaustionPolicy::Count(CountPolicy::new(
                    max_retries as usize,
                    Duration::from_millis(retry_delay_ms),
                ))
            }
            PolicyConfig::Deadline {
                timeout_ms,
                poll_interval_ms,
            } => {
                let timeout_ms = non_negative("timeout_ms", timeout_ms)?;
                if poll_interval_ms <= 0 {
                    return Err(ExecutorError::InvalidConfiguration(format!(
                        "poll_interval_ms must be positive, got {}",
                        poll_interval_ms
                    )));
                }
                ExhaustionPolicy::Deadline(DeadlinePolicy::new(
                    Duration::from_millis(timeout_ms),
                    Duration::from_millis(poll_interval_ms as u64),
                ))
            }
        };
        policy.validate()?;
        Ok(policy)
    }
}
