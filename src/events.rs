//! Domain events emitted by the engine.
//!
//! Status changes and endorsement moves are published on a broadcast
//! channel rather than calling the notification service directly; an
//! external notifier subscribes and does its own delivery. Delivery is
//! at-least-once within the process lifetime; a subscriber that falls
//! behind the channel capacity observes `RecvError::Lagged` and must
//! resynchronise from the store.

use rocket::tokio::sync::broadcast;
use serde::Serialize;

use crate::model::mongodb::Id;

/// Default channel capacity before slow subscribers start lagging.
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DomainEvent {
    /// A candidate fell below an endorsement cutoff.
    CandidateEliminated {
        candidate_id: Id,
        stage: u32,
        threshold: u64,
    },
    /// An endorsement was created (`active == true`) or revoked.
    EndorsementChanged {
        candidate_id: Id,
        voter_id: Id,
        active: bool,
    },
}

/// Handle for publishing and subscribing to domain events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Subscribe to all events published after this call.
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: DomainEvent) {
        if let Err(unsent) = self.sender.send(event) {
            trace!("No subscribers for domain event {:?}", unsent.0);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn subscribers_see_published_events() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        let event = DomainEvent::CandidateEliminated {
            candidate_id: Id::new(),
            stage: 1,
            threshold: 1000,
        };
        bus.publish(event.clone());

        assert_eq!(receiver.recv().await.unwrap(), event);
    }

    #[rocket::async_test]
    async fn publish_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(DomainEvent::EndorsementChanged {
            candidate_id: Id::new(),
            voter_id: Id::new(),
            active: true,
        });
    }

    #[rocket::async_test]
    async fn late_subscribers_miss_earlier_events() {
        let bus = EventBus::new();
        bus.publish(DomainEvent::EndorsementChanged {
            candidate_id: Id::new(),
            voter_id: Id::new(),
            active: false,
        });

        let mut receiver = bus.subscribe();
        let event = DomainEvent::CandidateEliminated {
            candidate_id: Id::new(),
            stage: 2,
            threshold: 500,
        };
        bus.publish(event.clone());
        assert_eq!(receiver.recv().await.unwrap(), event);
    }
}
