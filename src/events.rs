//! Event sink: republishing qualifying session callbacks.
//!
//! The registry posts one notification per qualifying callback, carrying the
//! session handle and event kind. The sink is a seam: the binary wires a
//! broadcast sink feeding the WebSocket endpoint; tests use a collecting
//! sink.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::session::{EventKind, SessionHandle};

/// A republished session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    /// The session the callback belonged to.
    pub handle: SessionHandle,
    /// The callback kind.
    pub event: EventKind,
}

/// Destination for republished session events.
pub trait EventSink: Send + Sync {
    /// Post one event notification.
    fn post(&self, event: SessionEvent);
}

/// Broadcast-channel sink for fan-out to any number of listeners.
///
/// Events posted while no listener is subscribed are dropped, matching the
/// fire-and-forget notification contract.
pub struct BroadcastSink {
    tx: broadcast::Sender<SessionEvent>,
}

impl BroadcastSink {
    /// Create a sink with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe a new listener.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventSink for BroadcastSink {
    fn post(&self, event: SessionEvent) {
        // Send only fails when there are no receivers; that's fine.
        let _ = self.tx.send(event);
    }
}

/// Sink that discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn post(&self, _event: SessionEvent) {}
}

/// Sink that records every event, for tests.
#[derive(Default)]
pub struct CollectSink {
    events: Mutex<Vec<SessionEvent>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events posted so far.
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of events posted so far.
    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for CollectSink {
    fn post(&self, event: SessionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
