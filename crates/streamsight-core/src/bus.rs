//! Broadcast bus for directory domain events.
//!
//! Components interested in extension lifecycle changes (the CLI, future
//! frontends) subscribe here instead of being called back directly.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default buffer for slow subscribers.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Domain events published by the extension directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirectoryEvent {
    /// An extension binary was deleted from the inventory.
    ExtensionDeleted { id: String, name: String },
    /// An extension archive was uploaded to the binary store.
    ExtensionUploaded { id: String, name: String },
    /// A restart of the engine was submitted.
    RestartRequested,
}

/// Broadcast bus carrying [`DirectoryEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DirectoryEvent>,
}

impl EventBus {
    /// Create a bus with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publish an event to all subscribers.
    ///
    /// Events published without subscribers are discarded. Returns `true`
    /// if at least one subscriber received the event.
    pub fn publish(&self, event: DirectoryEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> EventBusReceiver {
        EventBusReceiver {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver half of the bus.
pub struct EventBusReceiver {
    rx: broadcast::Receiver<DirectoryEvent>,
}

impl EventBusReceiver {
    /// Receive the next event, skipping over any lag gap.
    ///
    /// Returns `None` once the bus is closed.
    pub async fn recv(&mut self) -> Option<DirectoryEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive without blocking.
    pub fn try_recv(&mut self) -> Option<DirectoryEvent> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        assert!(bus.publish(DirectoryEvent::RestartRequested));
        assert_eq!(rx.recv().await, Some(DirectoryEvent::RestartRequested));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_discarded() {
        let bus = EventBus::new();
        assert!(!bus.publish(DirectoryEvent::ExtensionDeleted {
            id: "1".to_string(),
            name: "Math_AB_Extension".to_string(),
        }));
    }
}
