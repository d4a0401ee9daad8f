//! Change feed for the region registries.
//!
//! [`EventBus`] fans [`LoadBalancerEvent`]s out to any number of
//! in-process observers, e.g. an adapter keeping a describe cache warm or
//! an audit logger. Only mutations that changed a balancer are published,
//! so an observer can apply events without re-reading the registry.

use tokio::sync::broadcast;

use super::LoadBalancerEvent;

/// Cloneable handle on the change feed. All clones share one channel.
///
/// Observers that fall more than `capacity` events behind get
/// `RecvError::Lagged` and should re-read the affected balancers with
/// `describe_load_balancers`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LoadBalancerEvent>,
}

impl EventBus {
    /// Creates a feed buffering up to `capacity` events per observer
    /// (`EVENT_BUS_CAPACITY`). Zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Hands `event` to every current observer and returns how many there
    /// were. Nobody listening is normal for a bare registry, so the event
    /// is simply discarded then.
    pub fn publish(&self, event: LoadBalancerEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Registers an observer. It sees events published from now on, not
    /// earlier ones.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LoadBalancerEvent> {
        self.sender.subscribe()
    }

    /// Number of live observers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::RegionName;
    use chrono::Utc;

    fn make_event(name: &str) -> LoadBalancerEvent {
        let Ok(region) = RegionName::new("us-east-1") else {
            panic!("valid region");
        };
        LoadBalancerEvent::LoadBalancerDeleted {
            region,
            name: name.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(100);
        assert_eq!(bus.publish(make_event("lb")), 0);
    }

    #[test]
    fn zero_capacity_is_usable() {
        let bus = EventBus::new(0);
        let _rx = bus.subscribe();
        assert_eq!(bus.publish(make_event("lb")), 1);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(100);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.publish(make_event("web")), 2);

        let (Ok(e1), Ok(e2)) = (rx1.recv().await, rx2.recv().await) else {
            panic!("both receivers get the event");
        };
        assert_eq!(e1.load_balancer_name(), "web");
        assert_eq!(e2.load_balancer_name(), "web");
    }

    #[tokio::test]
    async fn lagging_observer_is_told_how_many_it_missed() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for name in ["a", "b", "c"] {
            let _ = bus.publish(make_event(name));
        }

        assert!(matches!(
            rx.recv().await,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(1))
        ));
        let Ok(event) = rx.recv().await else {
            panic!("newest events still buffered");
        };
        assert_eq!(event.load_balancer_name(), "b");
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = EventBus::new(100);
        assert_eq!(bus.receiver_count(), 0);

        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        drop(rx1);
        assert_eq!(bus.receiver_count(), 1);
    }
}
