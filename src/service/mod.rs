//! Service layer: operation orchestration.
//!
//! [`ElbService`] routes operations to the right region's registry, logs
//! mutations and emits events through the [`super::domain::EventBus`].

pub mod elb_service;

pub use elb_service::ElbService;
