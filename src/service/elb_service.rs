//! Load balancer service: region dispatch, logging and event emission.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    AccessLog, Applied, AttributeKind, ConnectionDraining, ConnectionSettings, CrossZoneLoadBalancing,
    EventBus, HealthCheck, ListenerSpec, LoadBalancer, LoadBalancerAttributes, LoadBalancerEvent,
    LoadBalancerRegistry, RegionName, RegionRegistries,
};
use crate::error::ElbError;

/// Orchestration layer for all registry operations.
///
/// Owns the [`RegionRegistries`] for state and an [`EventBus`] for event
/// emission. Every mutation follows the pattern: resolve region → apply
/// through the region's registry → log → emit event → return result.
#[derive(Debug, Clone)]
pub struct ElbService {
    regions: Arc<RegionRegistries>,
    event_bus: EventBus,
}

impl ElbService {
    /// Creates a new `ElbService`.
    #[must_use]
    pub fn new(regions: Arc<RegionRegistries>, event_bus: EventBus) -> Self {
        Self { regions, event_bus }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the region registries.
    #[must_use]
    pub fn regions(&self) -> &Arc<RegionRegistries> {
        &self.regions
    }

    /// Returns the registry of `region`.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::UnknownRegion`] if the region is not configured.
    pub fn registry(&self, region: &RegionName) -> Result<Arc<LoadBalancerRegistry>, ElbError> {
        self.regions.get(region)
    }

    /// Creates or replaces a load balancer.
    ///
    /// # Errors
    ///
    /// Returns a [`ElbError`] if the region is unknown or the arguments
    /// are invalid.
    pub async fn create_load_balancer(
        &self,
        region: &RegionName,
        name: &str,
        zones: Vec<String>,
        specs: &[ListenerSpec],
    ) -> Result<LoadBalancer, ElbError> {
        let balancer = self
            .registry(region)?
            .create_load_balancer(name, zones, specs)
            .await?;

        let _ = self.event_bus.publish(LoadBalancerEvent::LoadBalancerCreated {
            region: region.clone(),
            name: name.to_string(),
            zones: balancer.zones().to_vec(),
            listener_count: balancer.listeners().len(),
            timestamp: Utc::now(),
        });

        tracing::info!(%region, name, listeners = balancer.listeners().len(), "load balancer created");
        Ok(balancer)
    }

    /// Deletes a load balancer. Deleting an absent balancer succeeds and
    /// emits no event.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::UnknownRegion`] if the region is not configured.
    pub async fn delete_load_balancer(&self, region: &RegionName, name: &str) -> Result<(), ElbError> {
        if self.registry(region)?.delete_load_balancer(name).await {
            let _ = self.event_bus.publish(LoadBalancerEvent::LoadBalancerDeleted {
                region: region.clone(),
                name: name.to_string(),
                timestamp: Utc::now(),
            });
            tracing::info!(%region, name, "load balancer deleted");
        }
        Ok(())
    }

    /// Returns the named load balancer.
    ///
    /// # Errors
    ///
    /// Returns a [`ElbError`] if the region or the balancer is unknown.
    pub async fn get_load_balancer(
        &self,
        region: &RegionName,
        name: &str,
    ) -> Result<LoadBalancer, ElbError> {
        self.registry(region)?.get_load_balancer(name).await
    }

    /// Describes all balancers of a region, or only the named ones.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::UnknownRegion`] if the region is not configured.
    pub async fn describe_load_balancers<S: AsRef<str>>(
        &self,
        region: &RegionName,
        names: &[S],
    ) -> Result<Vec<LoadBalancer>, ElbError> {
        Ok(self.registry(region)?.describe_load_balancers(names).await)
    }

    /// Adds listeners on ports not already in use. Emits an event only
    /// when at least one listener was added.
    ///
    /// # Errors
    ///
    /// Returns a [`ElbError`] if the region or balancer is unknown or the
    /// request is invalid.
    pub async fn create_load_balancer_listeners(
        &self,
        region: &RegionName,
        name: &str,
        specs: &[ListenerSpec],
    ) -> Result<LoadBalancer, ElbError> {
        let Applied {
            load_balancer,
            changed: ports,
        } = self
            .registry(region)?
            .create_load_balancer_listeners(name, specs)
            .await?;

        if !ports.is_empty() {
            tracing::info!(%region, name, ?ports, "listeners created");
            let _ = self.event_bus.publish(LoadBalancerEvent::ListenersCreated {
                region: region.clone(),
                name: name.to_string(),
                ports,
                timestamp: Utc::now(),
            });
        }

        Ok(load_balancer)
    }

    /// Removes listeners by port. Emits an event only when at least one
    /// listener was removed.
    ///
    /// # Errors
    ///
    /// Returns a [`ElbError`] if the region or balancer is unknown.
    pub async fn delete_load_balancer_listeners(
        &self,
        region: &RegionName,
        name: &str,
        ports: &[u16],
    ) -> Result<LoadBalancer, ElbError> {
        let Applied {
            load_balancer,
            changed: removed,
        } = self
            .registry(region)?
            .delete_load_balancer_listeners(name, ports)
            .await?;

        if !removed.is_empty() {
            tracing::info!(%region, name, ports = ?removed, "listeners deleted");
            let _ = self.event_bus.publish(LoadBalancerEvent::ListenersDeleted {
                region: region.clone(),
                name: name.to_string(),
                ports: removed,
                timestamp: Utc::now(),
            });
        }

        Ok(load_balancer)
    }

    /// Replaces a listener's certificate. An unknown port is a no-op and
    /// emits no event.
    ///
    /// # Errors
    ///
    /// Returns a [`ElbError`] if the region or balancer is unknown.
    pub async fn set_load_balancer_listener_ssl_certificate(
        &self,
        region: &RegionName,
        name: &str,
        port: u16,
        ssl_certificate_id: &str,
    ) -> Result<LoadBalancer, ElbError> {
        let balancer = self
            .registry(region)?
            .set_load_balancer_listener_ssl_certificate(name, port, ssl_certificate_id)
            .await?;

        if balancer.listener(port).is_some() {
            tracing::info!(%region, name, port, "listener certificate updated");
            let _ = self
                .event_bus
                .publish(LoadBalancerEvent::ListenerCertificateUpdated {
                    region: region.clone(),
                    name: name.to_string(),
                    port,
                    ssl_certificate_id: ssl_certificate_id.to_string(),
                    timestamp: Utc::now(),
                });
        }

        Ok(balancer)
    }

    /// Replaces the health check of a balancer.
    ///
    /// # Errors
    ///
    /// Returns a [`ElbError`] if the region or balancer is unknown.
    pub async fn configure_health_check(
        &self,
        region: &RegionName,
        name: &str,
        health_check: HealthCheck,
    ) -> Result<HealthCheck, ElbError> {
        let check = self
            .registry(region)?
            .configure_health_check(name, health_check)
            .await?;

        tracing::info!(%region, name, target = %check.target, "health check configured");
        let _ = self.event_bus.publish(LoadBalancerEvent::HealthCheckConfigured {
            region: region.clone(),
            name: name.to_string(),
            target: check.target.clone(),
            timestamp: Utc::now(),
        });

        Ok(check)
    }

    /// Registers instances with a balancer. Emits an event only for ids
    /// that were not yet registered.
    ///
    /// # Errors
    ///
    /// Returns a [`ElbError`] if the region or balancer is unknown.
    pub async fn register_instances(
        &self,
        region: &RegionName,
        name: &str,
        instance_ids: &[String],
    ) -> Result<LoadBalancer, ElbError> {
        let Applied {
            load_balancer,
            changed: added,
        } = self
            .registry(region)?
            .register_instances(name, instance_ids)
            .await?;

        if !added.is_empty() {
            tracing::info!(%region, name, added = added.len(), registered = load_balancer.instance_ids().len(), "instances registered");
            let _ = self.event_bus.publish(LoadBalancerEvent::InstancesRegistered {
                region: region.clone(),
                name: name.to_string(),
                instance_ids: added,
                timestamp: Utc::now(),
            });
        }

        Ok(load_balancer)
    }

    /// Deregisters instances from a balancer. Emits an event only for ids
    /// that were registered.
    ///
    /// # Errors
    ///
    /// Returns a [`ElbError`] if the region or balancer is unknown.
    pub async fn deregister_instances(
        &self,
        region: &RegionName,
        name: &str,
        instance_ids: &[String],
    ) -> Result<LoadBalancer, ElbError> {
        let Applied {
            load_balancer,
            changed: removed,
        } = self
            .registry(region)?
            .deregister_instances(name, instance_ids)
            .await?;

        if !removed.is_empty() {
            tracing::info!(%region, name, removed = removed.len(), registered = load_balancer.instance_ids().len(), "instances deregistered");
            let _ = self.event_bus.publish(LoadBalancerEvent::InstancesDeregistered {
                region: region.clone(),
                name: name.to_string(),
                instance_ids: removed,
                timestamp: Utc::now(),
            });
        }

        Ok(load_balancer)
    }

    /// Returns the attribute record of a balancer.
    ///
    /// # Errors
    ///
    /// Returns a [`ElbError`] if the region or balancer is unknown.
    pub async fn get_load_balancer_attributes(
        &self,
        region: &RegionName,
        name: &str,
    ) -> Result<LoadBalancerAttributes, ElbError> {
        self.registry(region)?
            .get_load_balancer_attributes(name)
            .await
    }

    /// Replaces the cross-zone load balancing attribute.
    ///
    /// # Errors
    ///
    /// Returns a [`ElbError`] if the region or balancer is unknown.
    pub async fn set_cross_zone_load_balancing_attribute(
        &self,
        region: &RegionName,
        name: &str,
        attribute: CrossZoneLoadBalancing,
    ) -> Result<LoadBalancer, ElbError> {
        let balancer = self
            .registry(region)?
            .set_cross_zone_load_balancing_attribute(name, attribute)
            .await?;
        self.attribute_modified(region, name, AttributeKind::CrossZoneLoadBalancing);
        Ok(balancer)
    }

    /// Replaces the access log attribute.
    ///
    /// # Errors
    ///
    /// Returns a [`ElbError`] if the region or balancer is unknown.
    pub async fn set_access_log_attribute(
        &self,
        region: &RegionName,
        name: &str,
        attribute: AccessLog,
    ) -> Result<LoadBalancer, ElbError> {
        let balancer = self
            .registry(region)?
            .set_access_log_attribute(name, attribute)
            .await?;
        self.attribute_modified(region, name, AttributeKind::AccessLog);
        Ok(balancer)
    }

    /// Replaces the connection draining attribute.
    ///
    /// # Errors
    ///
    /// Returns a [`ElbError`] if the region or balancer is unknown.
    pub async fn set_connection_draining_attribute(
        &self,
        region: &RegionName,
        name: &str,
        attribute: ConnectionDraining,
    ) -> Result<LoadBalancer, ElbError> {
        let balancer = self
            .registry(region)?
            .set_connection_draining_attribute(name, attribute)
            .await?;
        self.attribute_modified(region, name, AttributeKind::ConnectionDraining);
        Ok(balancer)
    }

    /// Replaces the connection settings attribute.
    ///
    /// # Errors
    ///
    /// Returns a [`ElbError`] if the region or balancer is unknown.
    pub async fn set_connection_settings_attribute(
        &self,
        region: &RegionName,
        name: &str,
        attribute: ConnectionSettings,
    ) -> Result<LoadBalancer, ElbError> {
        let balancer = self
            .registry(region)?
            .set_connection_settings_attribute(name, attribute)
            .await?;
        self.attribute_modified(region, name, AttributeKind::ConnectionSettings);
        Ok(balancer)
    }

    fn attribute_modified(&self, region: &RegionName, name: &str, attribute: AttributeKind) {
        tracing::info!(%region, name, ?attribute, "attribute modified");
        let _ = self.event_bus.publish(LoadBalancerEvent::AttributeModified {
            region: region.clone(),
            name: name.to_string(),
            attribute,
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    fn region(name: &str) -> RegionName {
        let Ok(region) = RegionName::new(name) else {
            panic!("valid region");
        };
        region
    }

    fn make_service() -> ElbService {
        let regions = Arc::new(RegionRegistries::new([
            region("us-east-1"),
            region("eu-west-1"),
        ]));
        ElbService::new(regions, EventBus::new(1000))
    }

    async fn create(service: &ElbService, name: &str) {
        let result = service
            .create_load_balancer(
                &region("us-east-1"),
                name,
                vec!["us-east-1a".to_string()],
                &[ListenerSpec::new("http", 80, 8080)],
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn create_emits_event() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();
        create(&service, "web").await;

        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "load_balancer_created");
        assert_eq!(event.load_balancer_name(), "web");
    }

    #[tokio::test]
    async fn regions_are_isolated() {
        let service = make_service();
        create(&service, "web").await;

        let result = service.get_load_balancer(&region("eu-west-1"), "web").await;
        assert!(matches!(result, Err(ElbError::LoadBalancerNotFound(_))));

        let Ok(all) = service
            .describe_load_balancers::<&str>(&region("us-east-1"), &[])
            .await
        else {
            panic!("region configured");
        };
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn unknown_region_is_rejected() {
        let service = make_service();
        let result = service
            .create_load_balancer(&region("mars-1"), "web", Vec::new(), &[])
            .await;
        assert!(matches!(result, Err(ElbError::UnknownRegion(_))));
    }

    #[tokio::test]
    async fn delete_absent_emits_nothing() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();

        let result = service.delete_load_balancer(&region("us-east-1"), "ghost").await;
        assert!(result.is_ok());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn failed_mutation_emits_nothing() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();

        let result = service
            .register_instances(&region("us-east-1"), "ghost", &["i-1".to_string()])
            .await;
        assert!(result.is_err());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn reads_emit_nothing() {
        let service = make_service();
        create(&service, "web").await;
        let mut rx = service.event_bus().subscribe();

        let us_east = region("us-east-1");
        assert!(service.get_load_balancer(&us_east, "web").await.is_ok());
        assert!(service.get_load_balancer_attributes(&us_east, "web").await.is_ok());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn ineffective_membership_changes_emit_nothing() {
        let service = make_service();
        create(&service, "web").await;
        let us_east = region("us-east-1");
        let _ = service
            .register_instances(&us_east, "web", &["i-1".to_string()])
            .await;
        let mut rx = service.event_bus().subscribe();

        let Ok(lb) = service
            .create_load_balancer_listeners(&us_east, "web", &[ListenerSpec::new("tcp", 80, 9999)])
            .await
        else {
            panic!("balancer exists");
        };
        assert_eq!(lb.listener(80).map(|l| l.instance_port()), Some(8080));

        let repeated = vec!["i-1".to_string(), "i-1".to_string()];
        assert!(service.register_instances(&us_east, "web", &repeated).await.is_ok());
        assert!(
            service
                .deregister_instances(&us_east, "web", &["i-9".to_string()])
                .await
                .is_ok()
        );
        assert!(
            service
                .delete_load_balancer_listeners(&us_east, "web", &[25])
                .await
                .is_ok()
        );
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn membership_events_carry_effective_change() {
        let service = make_service();
        create(&service, "web").await;
        let us_east = region("us-east-1");
        let _ = service
            .register_instances(&us_east, "web", &["i-1".to_string()])
            .await;
        let mut rx = service.event_bus().subscribe();

        let _ = service
            .create_load_balancer_listeners(
                &us_east,
                "web",
                &[
                    ListenerSpec::new("tcp", 80, 9999),
                    ListenerSpec::new("tcp", 25, 2525),
                ],
            )
            .await;
        let ids = vec!["i-1".to_string(), "i-2".to_string(), "i-2".to_string()];
        let _ = service.register_instances(&us_east, "web", &ids).await;
        let _ = service
            .delete_load_balancer_listeners(&us_east, "web", &[25, 8000])
            .await;

        let Ok(LoadBalancerEvent::ListenersCreated { ports, .. }) = rx.try_recv() else {
            panic!("expected listeners_created");
        };
        assert_eq!(ports, vec![25]);

        let Ok(LoadBalancerEvent::InstancesRegistered { instance_ids, .. }) = rx.try_recv() else {
            panic!("expected instances_registered");
        };
        assert_eq!(instance_ids, vec!["i-2".to_string()]);

        let Ok(LoadBalancerEvent::ListenersDeleted { ports, .. }) = rx.try_recv() else {
            panic!("expected listeners_deleted");
        };
        assert_eq!(ports, vec![25]);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn mutation_events_in_order() {
        let service = make_service();
        create(&service, "web").await;
        let mut rx = service.event_bus().subscribe();
        let us_east = region("us-east-1");

        let _ = service
            .configure_health_check(&us_east, "web", HealthCheck::new(5, 3, 5, 30, "HTTP:8080/health"))
            .await;
        let _ = service
            .set_load_balancer_listener_ssl_certificate(&us_east, "web", 80, "arn:cert/a")
            .await;
        let _ = service
            .set_load_balancer_listener_ssl_certificate(&us_east, "web", 8443, "arn:cert/b")
            .await;
        let _ = service
            .set_connection_draining_attribute(
                &us_east,
                "web",
                ConnectionDraining {
                    enabled: true,
                    timeout: Some(60),
                },
            )
            .await;
        let _ = service.delete_load_balancer(&us_east, "web").await;

        let mut types = Vec::new();
        while let Ok(event) = rx.try_recv() {
            types.push(event.event_type_str());
        }
        assert_eq!(
            types,
            vec![
                "health_check_configured",
                "listener_certificate_updated",
                "attribute_modified",
                "load_balancer_deleted",
            ]
        );
    }

    #[tokio::test]
    async fn listener_and_instance_round() {
        let service = make_service();
        create(&service, "web").await;
        let us_east = region("us-east-1");

        let Ok(lb) = service
            .create_load_balancer_listeners(&us_east, "web", &[ListenerSpec::new("tcp", 25, 2525)])
            .await
        else {
            panic!("listeners added");
        };
        assert_eq!(lb.listeners().len(), 2);

        let Ok(lb) = service
            .delete_load_balancer_listeners(&us_east, "web", &[80])
            .await
        else {
            panic!("listeners removed");
        };
        assert_eq!(lb.listeners().len(), 1);

        let ids = vec!["i-1".to_string(), "i-1".to_string(), "i-2".to_string()];
        let Ok(lb) = service.register_instances(&us_east, "web", &ids).await else {
            panic!("registered");
        };
        assert_eq!(lb.instance_ids().len(), 2);

        let Ok(lb) = service
            .deregister_instances(&us_east, "web", &["i-2".to_string()])
            .await
        else {
            panic!("deregistered");
        };
        assert_eq!(lb.instance_ids(), ["i-1".to_string()].as_slice());
    }

    #[tokio::test]
    async fn attribute_setters_through_service() {
        let service = make_service();
        create(&service, "web").await;
        let us_east = region("us-east-1");

        let _ = service
            .set_cross_zone_load_balancing_attribute(&us_east, "web", CrossZoneLoadBalancing { enabled: true })
            .await;
        let _ = service
            .set_access_log_attribute(
                &us_east,
                "web",
                AccessLog {
                    enabled: true,
                    s3_bucket_name: Some("logs".to_string()),
                    ..AccessLog::default()
                },
            )
            .await;
        let _ = service
            .set_connection_settings_attribute(&us_east, "web", ConnectionSettings { idle_timeout: 30 })
            .await;

        let Ok(attrs) = service.get_load_balancer_attributes(&us_east, "web").await else {
            panic!("attributes readable");
        };
        assert!(attrs.cross_zone_load_balancing.enabled);
        assert!(attrs.access_log.enabled);
        assert!(!attrs.connection_draining.enabled);
        assert_eq!(attrs.connection_settings.idle_timeout, 30);
    }
}
