//! Balancer-wide attribute record.
//!
//! [`LoadBalancerAttributes`] holds four independent sub-attributes. Each is
//! replaced wholesale by its setter; fields are never merged.

use serde::Serialize;

/// Idle timeout applied to new load balancers, in seconds.
pub const DEFAULT_IDLE_TIMEOUT: u32 = 60;

/// Cross-zone load balancing toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrossZoneLoadBalancing {
    /// Whether traffic is spread across all registered zones.
    pub enabled: bool,
}

/// Connection draining settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionDraining {
    /// Whether in-flight requests drain before deregistration.
    pub enabled: bool,
    /// Maximum drain time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
}

/// Access log delivery settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessLog {
    /// Whether access logs are emitted.
    pub enabled: bool,
    /// Destination bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_bucket_name: Option<String>,
    /// Key prefix inside the bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_bucket_prefix: Option<String>,
    /// Publishing interval in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit_interval: Option<u32>,
}

/// Connection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionSettings {
    /// Idle connection timeout in seconds.
    pub idle_timeout: u32,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Names of the four sub-attributes, used in events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// [`CrossZoneLoadBalancing`].
    CrossZoneLoadBalancing,
    /// [`AccessLog`].
    AccessLog,
    /// [`ConnectionDraining`].
    ConnectionDraining,
    /// [`ConnectionSettings`].
    ConnectionSettings,
}

/// The full attribute record of a load balancer.
///
/// `Default` is the record every new balancer starts with: every feature
/// disabled and an idle timeout of [`DEFAULT_IDLE_TIMEOUT`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadBalancerAttributes {
    /// Cross-zone load balancing.
    pub cross_zone_load_balancing: CrossZoneLoadBalancing,
    /// Connection draining.
    pub connection_draining: ConnectionDraining,
    /// Access logging.
    pub access_log: AccessLog,
    /// Connection settings.
    pub connection_settings: ConnectionSettings,
}
