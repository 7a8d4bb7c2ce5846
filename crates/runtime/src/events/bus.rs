//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use casino_core::LedgerEntry;

use super::types::{Notice, SessionEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, strum::Display)]
pub enum Topic {
    /// Session lifecycle, balance and modifier changes
    Session,
    /// Settled sessions appended to the ledger
    Ledger,
    /// Display messages for the player
    Notice,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Session, Topic::Ledger, Topic::Notice];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Session(SessionEvent),
    Ledger(Box<LedgerEntry>),
    Notice(Notice),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Session(_) => Topic::Session,
            Event::Ledger(_) => Topic::Ledger,
            Event::Notice(_) => Topic::Notice,
        }
    }
}

/// Topic-based event bus
///
/// One broadcast channel per topic, created up front; consumers subscribe
/// only to what they render. Publishing never blocks and never fails.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<Event>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();

        Self {
            channels: Arc::new(channels),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if let Some(tx) = self.channels.get(&topic)
            && tx.send(event).is_err()
        {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(%topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        match self.channels.get(&topic) {
            Some(tx) => tx.subscribe(),
            // Every topic is registered in `with_capacity`; a detached
            // receiver just reports `Closed`.
            None => broadcast::channel(1).1,
        }
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
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
    use crate::events::NoticeLevel;

    #[tokio::test]
    async fn routes_by_topic() {
        let bus = EventBus::with_capacity(4);
        let mut notices = bus.subscribe(Topic::Notice);
        let mut sessions = bus.subscribe(Topic::Session);

        bus.publish(Event::Notice(Notice::new(NoticeLevel::Info, "hello")));
        match notices.recv().await.unwrap() {
            Event::Notice(notice) => assert_eq!(notice.message, "hello"),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(sessions.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(Event::Session(SessionEvent::BalanceChanged { balance: 5 }));
        assert_eq!(bus.subscribe_multiple(&Topic::ALL).len(), 3);
    }
}
