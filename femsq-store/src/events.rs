//! Change notification.
//!
//! Stores hold plain state; a UI layer that wants to re-render subscribes to
//! the store's event channel and re-reads the snapshot it cares about.

use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// What changed in a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// Main list or its pagination changed
    ListChanged,
    SelectionChanged,
    /// Dependent list of the selection changed
    DependentsChanged,
    LoadingChanged,
    ErrorChanged,
    /// A cache gained or lost entries
    CacheChanged,
    /// Connection state or its messages changed
    StatusChanged,
    /// Active view changed
    ViewChanged,
    /// Store restored to its defaults
    Reset,
}

/// Per-store broadcast channel
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Subscribe to store events
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Notify subscribers; a store with no subscribers drops the event.
    pub fn emit(&self, event: StoreEvent) {
        let _ = self.tx.send(event);
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

    #[tokio::test]
    async fn test_subscribers_receive_events_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(StoreEvent::ListChanged);
        bus.emit(StoreEvent::Reset);

        assert_eq!(rx.recv().await.unwrap(), StoreEvent::ListChanged);
        assert_eq!(rx.recv().await.unwrap(), StoreEvent::Reset);
    }

    #[test]
    fn test_emit_without_subscribers() {
        EventBus::new().emit(StoreEvent::ErrorChanged);
    }
}
