//! Domain events reflecting registry mutations.
//!
//! Every successful mutation made through [`crate::service::ElbService`]
//! emits a [`LoadBalancerEvent`] through the [`super::EventBus`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::RegionName;
use super::attributes::AttributeKind;

/// Domain event emitted after every registry mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LoadBalancerEvent {
    /// A load balancer was created or replaced.
    LoadBalancerCreated {
        /// Region of the balancer.
        region: RegionName,
        /// Balancer name.
        name: String,
        /// Availability zones.
        zones: Vec<String>,
        /// Number of listeners at creation.
        listener_count: usize,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A load balancer was removed.
    LoadBalancerDeleted {
        /// Region of the balancer.
        region: RegionName,
        /// Balancer name.
        name: String,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Listeners were requested on a balancer.
    ListenersCreated {
        /// Region of the balancer.
        region: RegionName,
        /// Balancer name.
        name: String,
        /// Requested load balancer ports.
        ports: Vec<u16>,
        /// Timestamp of the change.
        timestamp: DateTime<Utc>,
    },

    /// Listeners were removed from a balancer.
    ListenersDeleted {
        /// Region of the balancer.
        region: RegionName,
        /// Balancer name.
        name: String,
        /// Requested load balancer ports.
        ports: Vec<u16>,
        /// Timestamp of the change.
        timestamp: DateTime<Utc>,
    },

    /// A listener certificate was replaced.
    ListenerCertificateUpdated {
        /// Region of the balancer.
        region: RegionName,
        /// Balancer name.
        name: String,
        /// Listener port.
        port: u16,
        /// New certificate id.
        ssl_certificate_id: String,
        /// Timestamp of the change.
        timestamp: DateTime<Utc>,
    },

    /// The health check was replaced.
    HealthCheckConfigured {
        /// Region of the balancer.
        region: RegionName,
        /// Balancer name.
        name: String,
        /// Probe target.
        target: String,
        /// Timestamp of the change.
        timestamp: DateTime<Utc>,
    },

    /// Instances were registered.
    InstancesRegistered {
        /// Region of the balancer.
        region: RegionName,
        /// Balancer name.
        name: String,
        /// Requested instance ids.
        instance_ids: Vec<String>,
        /// Timestamp of the change.
        timestamp: DateTime<Utc>,
    },

    /// Instances were deregistered.
    InstancesDeregistered {
        /// Region of the balancer.
        region: RegionName,
        /// Balancer name.
        name: String,
        /// Requested instance ids.
        instance_ids: Vec<String>,
        /// Timestamp of the change.
        timestamp: DateTime<Utc>,
    },

    /// One sub-attribute was replaced.
    AttributeModified {
        /// Region of the balancer.
        region: RegionName,
        /// Balancer name.
        name: String,
        /// Which sub-attribute changed.
        attribute: AttributeKind,
        /// Timestamp of the change.
        timestamp: DateTime<Utc>,
    },
}

impl LoadBalancerEvent {
    /// Returns the name of the balancer this event concerns.
    #[must_use]
    pub fn load_balancer_name(&self) -> &str {
        match self {
            Self::LoadBalancerCreated { name, .. }
            | Self::LoadBalancerDeleted { name, .. }
            | Self::ListenersCreated { name, .. }
            | Self::ListenersDeleted { name, .. }
            | Self::ListenerCertificateUpdated { name, .. }
            | Self::HealthCheckConfigured { name, .. }
            | Self::InstancesRegistered { name, .. }
            | Self::InstancesDeregistered { name, .. }
            | Self::AttributeModified { name, .. } => name,
        }
    }

    /// Returns the region this event concerns.
    #[must_use]
    pub fn region(&self) -> &RegionName {
        match self {
            Self::LoadBalancerCreated { region, .. }
            | Self::LoadBalancerDeleted { region, .. }
            | Self::ListenersCreated { region, .. }
            | Self::ListenersDeleted { region, .. }
            | Self::ListenerCertificateUpdated { region, .. }
            | Self::HealthCheckConfigured { region, .. }
            | Self::InstancesRegistered { region, .. }
            | Self::InstancesDeregistered { region, .. }
            | Self::AttributeModified { region, .. } => region,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::LoadBalancerCreated { .. } => "load_balancer_created",
            Self::LoadBalancerDeleted { .. } => "load_balancer_deleted",
            Self::ListenersCreated { .. } => "listeners_created",
            Self::ListenersDeleted { .. } => "listeners_deleted",
            Self::ListenerCertificateUpdated { .. } => "listener_certificate_updated",
            Self::HealthCheckConfigured { .. } => "health_check_configured",
            Self::InstancesRegistered { .. } => "instances_registered",
            Self::InstancesDeregistered { .. } => "instances_deregistered",
            Self::AttributeModified { .. } => "attribute_modified",
        }
    }
}
