//! The load balancer aggregate.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::attributes::LoadBalancerAttributes;
use super::health_check::HealthCheck;
use super::listener::{Listener, ListenerSpec};
use crate::error::ElbError;

/// Attributes a real provider computes at provisioning time. Recognized by
/// [`LoadBalancer::attribute`] but never resolved.
const DERIVED_ATTRIBUTES: [&str; 5] = [
    "CanonicalHostedZoneName",
    "CanonicalHostedZoneNameID",
    "DNSName",
    "SourceSecurityGroup.GroupName",
    "SourceSecurityGroup.OwnerAlias",
];

/// Aggregate root for one load balancer in a region.
///
/// Listeners keep insertion order and are unique by load balancer port.
/// Instance ids keep registration order and contain no duplicates.
#[derive(Debug, Clone, Serialize)]
pub struct LoadBalancer {
    name: String,
    zones: Vec<String>,
    listeners: Vec<Listener>,
    health_check: Option<HealthCheck>,
    instance_ids: Vec<String>,
    attributes: LoadBalancerAttributes,
    created_at: DateTime<Utc>,
}

impl LoadBalancer {
    /// Creates a balancer with default attributes and the given listeners.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::InvalidRequest`] if the name is empty or the
    /// listener specs repeat a port or use port zero.
    pub fn new(name: &str, zones: Vec<String>, specs: &[ListenerSpec]) -> Result<Self, ElbError> {
        if name.trim().is_empty() {
            return Err(ElbError::InvalidRequest(
                "load balancer name must not be empty".to_string(),
            ));
        }
        super::listener::validate_specs(specs)?;

        Ok(Self {
            name: name.to_string(),
            zones,
            listeners: specs.iter().map(Listener::from).collect(),
            health_check: None,
            instance_ids: Vec::new(),
            attributes: LoadBalancerAttributes::default(),
            created_at: Utc::now(),
        })
    }

    /// Registry key, unique within a region.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier used when the balancer is referenced from templates.
    #[must_use]
    pub fn physical_resource_id(&self) -> &str {
        &self.name
    }

    /// Availability zones, in the order given at creation.
    #[must_use]
    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    /// Listeners in insertion order.
    #[must_use]
    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    /// Listener on the given public port.
    #[must_use]
    pub fn listener(&self, load_balancer_port: u16) -> Option<&Listener> {
        self.listeners
            .iter()
            .find(|l| l.load_balancer_port() == load_balancer_port)
    }

    /// Current health check, absent until configured.
    #[must_use]
    pub const fn health_check(&self) -> Option<&HealthCheck> {
        self.health_check.as_ref()
    }

    /// Registered instance ids in registration order.
    #[must_use]
    pub fn instance_ids(&self) -> &[String] {
        &self.instance_ids
    }

    /// Attribute record.
    #[must_use]
    pub const fn attributes(&self) -> &LoadBalancerAttributes {
        &self.attributes
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Appends listeners for ports not already in use and returns the
    /// ports that were added. Occupied ports keep their existing listener.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::InvalidRequest`] if the request itself repeats a
    /// port or uses port zero. Nothing is added in that case.
    pub fn add_listeners(&mut self, specs: &[ListenerSpec]) -> Result<Vec<u16>, ElbError> {
        super::listener::validate_specs(specs)?;

        let mut added = Vec::new();
        for spec in specs {
            if self.listener(spec.load_balancer_port).is_some() {
                continue;
            }
            self.listeners.push(Listener::from(spec));
            added.push(spec.load_balancer_port);
        }
        Ok(added)
    }

    /// Drops every listener whose port is in `ports` and returns the ports
    /// actually removed.
    pub fn remove_listeners(&mut self, ports: &[u16]) -> Vec<u16> {
        let mut removed = Vec::new();
        self.listeners.retain(|listener| {
            let port = listener.load_balancer_port();
            if ports.contains(&port) {
                removed.push(port);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Replaces the certificate of the listener on `load_balancer_port`.
    ///
    /// Returns `false` when no listener uses that port.
    pub fn set_listener_certificate(
        &mut self,
        load_balancer_port: u16,
        ssl_certificate_id: &str,
    ) -> bool {
        match self
            .listeners
            .iter_mut()
            .find(|l| l.load_balancer_port() == load_balancer_port)
        {
            Some(listener) => {
                listener.set_ssl_certificate_id(ssl_certificate_id.to_string());
                true
            }
            None => false,
        }
    }

    /// Replaces the health check.
    pub fn set_health_check(&mut self, health_check: HealthCheck) {
        self.health_check = Some(health_check);
    }

    /// Mutable access to the attribute record for wholesale replacement of
    /// a single sub-attribute.
    pub fn attributes_mut(&mut self) -> &mut LoadBalancerAttributes {
        &mut self.attributes
    }

    /// Registers instance ids, skipping ids already present (including
    /// repeats within `instance_ids`). Returns the ids newly added.
    pub fn register_instances(&mut self, instance_ids: &[String]) -> Vec<String> {
        let mut added = Vec::new();
        for id in instance_ids {
            if self.instance_ids.contains(id) {
                continue;
            }
            self.instance_ids.push(id.clone());
            added.push(id.clone());
        }
        added
    }

    /// Deregisters instance ids. Unknown ids are ignored. Returns the ids
    /// actually removed.
    pub fn deregister_instances(&mut self, instance_ids: &[String]) -> Vec<String> {
        let mut removed = Vec::new();
        self.instance_ids.retain(|id| {
            if instance_ids.contains(id) {
                removed.push(id.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Resolves a template-style attribute reference.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::Unsupported`] for provider-computed attributes
    /// (DNS name, hosted zone, source security group) and
    /// [`ElbError::UnknownAttribute`] for anything unrecognized.
    pub fn attribute(&self, attribute: &str) -> Result<String, ElbError> {
        if attribute == "LoadBalancerName" {
            return Ok(self.name.clone());
        }
        if DERIVED_ATTRIBUTES.contains(&attribute) {
            return Err(ElbError::Unsupported(attribute.to_string()));
        }
        Err(ElbError::UnknownAttribute(attribute.to_string()))
    }
}
