//! # elb-registry
//!
//! In-memory control-plane registry emulating a classic cloud load-balancer
//! management API.
//!
//! The crate tracks load balancers per region together with their
//! listeners, health checks, registered instances and attributes. Callers
//! (API adapters) pass already-parsed, typed arguments and receive domain
//! values back; request decoding, response encoding and routing are left
//! to them.
//!
//! ## Architecture
//!
//! ```text
//! API adapter (external)
//!     │
//!     ├── ElbService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── RegionRegistries (domain/)
//!     └── LoadBalancerRegistry → LoadBalancer (domain/)
//! ```
//!
//! ## Example
//!
//! ```
//! use elb_registry::config::ElbConfig;
//! use elb_registry::domain::{ListenerSpec, RegionName};
//!
//! # async fn run() -> Result<(), elb_registry::error::ElbError> {
//! let service = ElbConfig::default().build_service();
//! let region = RegionName::new("us-east-1")?;
//!
//! service
//!     .create_load_balancer(
//!         &region,
//!         "web",
//!         vec!["us-east-1a".to_string()],
//!         &[ListenerSpec::new("http", 80, 8080)],
//!     )
//!     .await?;
//! let lb = service.get_load_balancer(&region, "web").await?;
//! assert_eq!(lb.listeners().len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod service;
