//! # Event Publisher
//!
//! Publishing side of the bus and its in-memory `broadcast` implementation.

use crate::events::{EventFilter, ReportEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing events to the bus.
///
/// The indexer, the assembler and the ledger watcher emit through this
/// interface; consumers never call each other directly.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event and return the number of receivers it reached.
    async fn publish(&self, event: ReportEvent) -> usize;

    /// Total events published.
    fn events_published(&self) -> u64;
}

/// In-memory event bus.
///
/// Multi-producer, multi-consumer over `tokio::sync::broadcast`. Peer gossip
/// is bridged onto this bus by the transport layer.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<ReportEvent>,
    events_published: AtomicU64,
    /// Events lost by lagging subscribers
    events_lagged: Arc<AtomicU64>,
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
            events_lagged: Arc::new(AtomicU64::new(0)),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    ///
    /// Only events published after this call are delivered.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "New subscription created");
        Subscription::new(self.sender.subscribe(), filter, self.events_lagged.clone())
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Events lost by lagging subscribers since the bus was created.
    #[must_use]
    pub fn events_lagged(&self) -> u64 {
        self.events_lagged.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: ReportEvent) -> usize {
        let topic = event.topic();
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(topic = ?topic, receivers, "Event published");
                receivers
            }
            Err(_) => {
                warn!(topic = ?topic, "Event dropped (no receivers)");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
