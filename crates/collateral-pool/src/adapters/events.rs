//! Event sinks.

use crate::domain::PoolEvent;
use crate::ports::EventSink;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Collects events in memory. Clones share the buffer.
#[derive(Clone, Debug, Default)]
pub struct InMemoryEventSink {
    events: Arc<Mutex<Vec<PoolEvent>>>,
}

impl InMemoryEventSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events published so far.
    pub fn events(&self) -> Vec<PoolEvent> {
        self.events.lock().clone()
    }

    /// Remove and return all events.
    pub fn drain(&self) -> Vec<PoolEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for InMemoryEventSink {
    fn publish(&self, event: PoolEvent) {
        self.events.lock().push(event);
    }
}

/// Writes each event to the tracing log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, event: PoolEvent) {
        info!(kind = event.kind(), event = ?event, "pool event");
    }
}
