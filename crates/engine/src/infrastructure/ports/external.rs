//! Event transport port.

use skirmish_domain::DomainEvent;

/// Delivers events to subscribers of the event's topic.
///
/// Must return without waiting on any subscriber. Delivery is at most once;
/// failures are the implementation's to log and drop.
#[cfg_attr(test, mockall::automock)]
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: DomainEvent);
}
