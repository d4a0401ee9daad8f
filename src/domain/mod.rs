//! Domain layer: load balancer aggregate, per-region registries, events.
//!
//! Holds the value objects (listeners, health checks, attributes), the
//! [`LoadBalancer`] aggregate, the per-region [`LoadBalancerRegistry`] and
//! the [`EventBus`] used to broadcast mutations.

pub mod attributes;
pub mod event;
pub mod event_bus;
pub mod health_check;
pub mod listener;
pub mod load_balancer;
pub mod region;
pub mod registry;

pub use attributes::{
    AccessLog, AttributeKind, ConnectionDraining, ConnectionSettings, CrossZoneLoadBalancing,
    LoadBalancerAttributes,
};
pub use event::LoadBalancerEvent;
pub use event_bus::EventBus;
pub use health_check::HealthCheck;
pub use listener::{Listener, ListenerSpec};
pub use load_balancer::LoadBalancer;
pub use region::{RegionName, RegionRegistries};
pub use registry::{Applied, LoadBalancerRegistry};
