//! Gateway runtime configuration.

use datagate_types::Timeout;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings of the gateway runtime.
///
/// Deserializable from any serde format; unspecified fields fall back to
/// the defaults below.
///
/// | Field | Default | Meaning |
/// |-------|---------|---------|
/// | `multi_tenant` | `true` | route via the dynamic registry instead of a fixed engine set |
/// | `worker_threads` | `4` | concurrent executions on the worker scheduler |
/// | `request_timeout` | `30000ms` | deadline enforced by the cancellation bridge |
///
/// # Example
///
/// ```
/// use datagate_runtime::GatewaySettings;
///
/// let settings: GatewaySettings =
///     serde_json::from_str(r#"{ "worker_threads": 8, "request_timeout": "5000ms" }"#).unwrap();
/// assert!(settings.multi_tenant);
/// assert_eq!(settings.worker_threads, 8);
/// settings.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewaySettings {
    /// Route via the dynamic registry (`true`) or a fixed engine set.
    pub multi_tenant: bool,
    /// Concurrent executions on the worker scheduler.
    pub worker_threads: usize,
    /// Deadline enforced by the cancellation bridge; undefined disables
    /// the deadline.
    pub request_timeout: Timeout,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            multi_tenant: true,
            worker_threads: 4,
            request_timeout: Timeout::from_millis(30_000),
        }
    }
}

impl GatewaySettings {
    /// Checks invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Fails when `worker_threads` is zero.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.worker_threads == 0 {
            return Err(SettingsError::NoWorkerThreads);
        }
        Ok(())
    }
}

/// Invalid gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// `worker_threads` must be at least one.
    #[error("worker_threads must be at least 1")]
    NoWorkerThreads,
}
