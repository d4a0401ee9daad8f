//! Per-region load balancer storage with per-balancer locking.
//!
//! [`LoadBalancerRegistry`] stores every load balancer of a region in a
//! `HashMap` keyed by name, where each entry is individually protected by a
//! [`tokio::sync::RwLock`]. Reads of one balancer run concurrently, writes
//! to different balancers run concurrently, and writes to the same balancer
//! are serialized.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::attributes::{
    AccessLog, ConnectionDraining, ConnectionSettings, CrossZoneLoadBalancing,
    LoadBalancerAttributes,
};
use super::health_check::HealthCheck;
use super::listener::ListenerSpec;
use super::load_balancer::LoadBalancer;
use crate::error::ElbError;

/// Snapshot returned by membership mutations together with the ports or
/// instance ids the call actually added or removed.
#[derive(Debug, Clone)]
pub struct Applied<T> {
    /// Balancer state after the mutation.
    pub load_balancer: LoadBalancer,
    /// Effective change; empty when the call was a no-op.
    pub changed: Vec<T>,
}

/// Authoritative in-memory store of the load balancers of one region.
///
/// Every operation that needs an existing balancer resolves it first and
/// fails with [`ElbError::LoadBalancerNotFound`] before touching any field.
/// Returned aggregates are snapshots taken under the balancer's lock.
#[derive(Debug, Default)]
pub struct LoadBalancerRegistry {
    balancers: RwLock<HashMap<String, Arc<RwLock<LoadBalancer>>>>,
}

impl LoadBalancerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            balancers: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a load balancer, replacing any balancer with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::InvalidRequest`] if the name is empty or the
    /// listener specs repeat a port or use port zero. The registry is left
    /// untouched in that case.
    pub async fn create_load_balancer(
        &self,
        name: &str,
        zones: Vec<String>,
        specs: &[ListenerSpec],
    ) -> Result<LoadBalancer, ElbError> {
        let balancer = LoadBalancer::new(name, zones, specs)?;
        let snapshot = balancer.clone();

        let mut map = self.balancers.write().await;
        let replaced = map
            .insert(name.to_string(), Arc::new(RwLock::new(balancer)))
            .is_some();
        if replaced {
            tracing::debug!(name, "replaced existing load balancer");
        }
        Ok(snapshot)
    }

    /// Removes a load balancer. Returns `false` if no balancer had that
    /// name, which is not an error.
    pub async fn delete_load_balancer(&self, name: &str) -> bool {
        let removed = self.balancers.write().await.remove(name).is_some();
        if !removed {
            tracing::debug!(name, "delete of absent load balancer ignored");
        }
        removed
    }

    /// Returns a snapshot of the named balancer.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::LoadBalancerNotFound`] if the name is unknown.
    pub async fn get_load_balancer(&self, name: &str) -> Result<LoadBalancer, ElbError> {
        let entry = self.entry(name).await?;
        let balancer = entry.read().await;
        Ok(balancer.clone())
    }

    /// Returns every balancer when `names` is empty, otherwise the
    /// balancers whose name is listed. Unknown names are skipped.
    ///
    /// Order follows the registry's iteration order.
    pub async fn describe_load_balancers<S: AsRef<str>>(&self, names: &[S]) -> Vec<LoadBalancer> {
        let map = self.balancers.read().await;
        let mut balancers = Vec::with_capacity(map.len());
        for (name, entry) in map.iter() {
            if !names.is_empty() && !names.iter().any(|n| n.as_ref() == name) {
                continue;
            }
            balancers.push(entry.read().await.clone());
        }
        balancers
    }

    /// Adds listeners on ports not yet in use; occupied ports keep their
    /// existing listener. `changed` holds the ports actually added.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::LoadBalancerNotFound`] if the name is unknown,
    /// or [`ElbError::InvalidRequest`] if the request repeats a port or
    /// uses port zero.
    pub async fn create_load_balancer_listeners(
        &self,
        name: &str,
        specs: &[ListenerSpec],
    ) -> Result<Applied<u16>, ElbError> {
        self.mutate(name, |balancer| {
            let added = balancer.add_listeners(specs)?;
            tracing::debug!(name, added = added.len(), requested = specs.len(), "listeners added");
            Ok(added)
        })
        .await
        .map(Applied::from)
    }

    /// Removes every listener whose port is in `ports`. `changed` holds the
    /// ports actually removed.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::LoadBalancerNotFound`] if the name is unknown.
    pub async fn delete_load_balancer_listeners(
        &self,
        name: &str,
        ports: &[u16],
    ) -> Result<Applied<u16>, ElbError> {
        self.mutate(name, |balancer| {
            let removed = balancer.remove_listeners(ports);
            tracing::debug!(name, removed = removed.len(), "listeners removed");
            Ok(removed)
        })
        .await
        .map(Applied::from)
    }

    /// Replaces the certificate of the listener on `load_balancer_port`.
    /// A missing listener leaves the balancer unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::LoadBalancerNotFound`] if the name is unknown.
    pub async fn set_load_balancer_listener_ssl_certificate(
        &self,
        name: &str,
        load_balancer_port: u16,
        ssl_certificate_id: &str,
    ) -> Result<LoadBalancer, ElbError> {
        self.mutate(name, |balancer| {
            if !balancer.set_listener_certificate(load_balancer_port, ssl_certificate_id) {
                tracing::debug!(name, load_balancer_port, "no listener on port, certificate unchanged");
            }
            Ok(())
        })
        .await
        .map(|(balancer, ())| balancer)
    }

    /// Replaces the health check of the named balancer.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::LoadBalancerNotFound`] if the name is unknown.
    pub async fn configure_health_check(
        &self,
        name: &str,
        health_check: HealthCheck,
    ) -> Result<HealthCheck, ElbError> {
        let entry = self.entry(name).await?;
        entry.write().await.set_health_check(health_check.clone());
        Ok(health_check)
    }

    /// Registers instance ids; ids already registered are skipped.
    /// `changed` holds the ids newly registered.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::LoadBalancerNotFound`] if the name is unknown.
    pub async fn register_instances(
        &self,
        name: &str,
        instance_ids: &[String],
    ) -> Result<Applied<String>, ElbError> {
        self.mutate(name, |balancer| {
            let added = balancer.register_instances(instance_ids);
            tracing::debug!(name, added = added.len(), requested = instance_ids.len(), "instances registered");
            Ok(added)
        })
        .await
        .map(Applied::from)
    }

    /// Deregisters instance ids; ids not registered are ignored.
    /// `changed` holds the ids actually removed.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::LoadBalancerNotFound`] if the name is unknown.
    pub async fn deregister_instances(
        &self,
        name: &str,
        instance_ids: &[String],
    ) -> Result<Applied<String>, ElbError> {
        self.mutate(name, |balancer| {
            let removed = balancer.deregister_instances(instance_ids);
            tracing::debug!(name, removed = removed.len(), requested = instance_ids.len(), "instances deregistered");
            Ok(removed)
        })
        .await
        .map(Applied::from)
    }

    /// Returns a copy of the attribute record.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::LoadBalancerNotFound`] if the name is unknown.
    pub async fn get_load_balancer_attributes(
        &self,
        name: &str,
    ) -> Result<LoadBalancerAttributes, ElbError> {
        let entry = self.entry(name).await?;
        let balancer = entry.read().await;
        Ok(balancer.attributes().clone())
    }

    /// Replaces the cross-zone load balancing attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::LoadBalancerNotFound`] if the name is unknown.
    pub async fn set_cross_zone_load_balancing_attribute(
        &self,
        name: &str,
        attribute: CrossZoneLoadBalancing,
    ) -> Result<LoadBalancer, ElbError> {
        self.mutate(name, |balancer| {
            balancer.attributes_mut().cross_zone_load_balancing = attribute;
            Ok(())
        })
        .await
        .map(|(balancer, ())| balancer)
    }

    /// Replaces the access log attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::LoadBalancerNotFound`] if the name is unknown.
    pub async fn set_access_log_attribute(
        &self,
        name: &str,
        attribute: AccessLog,
    ) -> Result<LoadBalancer, ElbError> {
        self.mutate(name, |balancer| {
            balancer.attributes_mut().access_log = attribute;
            Ok(())
        })
        .await
        .map(|(balancer, ())| balancer)
    }

    /// Replaces the connection draining attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::LoadBalancerNotFound`] if the name is unknown.
    pub async fn set_connection_draining_attribute(
        &self,
        name: &str,
        attribute: ConnectionDraining,
    ) -> Result<LoadBalancer, ElbError> {
        self.mutate(name, |balancer| {
            balancer.attributes_mut().connection_draining = attribute;
            Ok(())
        })
        .await
        .map(|(balancer, ())| balancer)
    }

    /// Replaces the connection settings attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::LoadBalancerNotFound`] if the name is unknown.
    pub async fn set_connection_settings_attribute(
        &self,
        name: &str,
        attribute: ConnectionSettings,
    ) -> Result<LoadBalancer, ElbError> {
        self.mutate(name, |balancer| {
            balancer.attributes_mut().connection_settings = attribute;
            Ok(())
        })
        .await
        .map(|(balancer, ())| balancer)
    }

    /// Returns the number of balancers in the registry.
    pub async fn len(&self) -> usize {
        self.balancers.read().await.len()
    }

    /// Returns `true` if the registry holds no balancers.
    pub async fn is_empty(&self) -> bool {
        self.balancers.read().await.is_empty()
    }

    async fn entry(&self, name: &str) -> Result<Arc<RwLock<LoadBalancer>>, ElbError> {
        let map = self.balancers.read().await;
        map.get(name).cloned().ok_or_else(|| ElbError::not_found(name))
    }

    /// Applies `f` under the balancer's write lock and returns a snapshot
    /// with `f`'s output. `f` must validate before writing; an error leaves
    /// the balancer as it was.
    async fn mutate<R, F>(&self, name: &str, f: F) -> Result<(LoadBalancer, R), ElbError>
    where
        F: FnOnce(&mut LoadBalancer) -> Result<R, ElbError>,
    {
        let entry = self.entry(name).await?;
        let mut balancer = entry.write().await;
        let output = f(&mut *balancer)?;
        Ok((balancer.clone(), output))
    }
}

impl<T> From<(LoadBalancer, Vec<T>)> for Applied<T> {
    fn from((load_balancer, changed): (LoadBalancer, Vec<T>)) -> Self {
        Self {
            load_balancer,
            changed,
        }
    }
}
