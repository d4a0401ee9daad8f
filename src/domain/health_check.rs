//! Health check probe configuration.

use serde::Serialize;

/// Probe configuration attached to a load balancer.
///
/// Immutable once built; reconfiguration replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    /// Seconds to wait for a probe response.
    pub timeout: u32,
    /// Consecutive successes before an instance is marked healthy.
    pub healthy_threshold: u32,
    /// Consecutive failures before an instance is marked unhealthy.
    pub unhealthy_threshold: u32,
    /// Seconds between probes.
    pub interval: u32,
    /// Probe target, e.g. `HTTP:8080/health`.
    pub target: String,
}

impl HealthCheck {
    /// Creates a new `HealthCheck`.
    #[must_use]
    pub fn new(
        timeout: u32,
        healthy_threshold: u32,
        unhealthy_threshold: u32,
        interval: u32,
        target: impl Into<String>,
    ) -> Self {
        Self {
            timeout,
            healthy_threshold,
            unhealthy_threshold,
            interval,
            target: target.into(),
        }
    }
}
