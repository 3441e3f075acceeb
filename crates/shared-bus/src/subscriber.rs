//! # Event Subscriber
//!
//! Receiving side of the bus. A subscriber that falls more than the channel
//! capacity behind loses the oldest events; the loss is logged and counted so
//! that a missed proof surfaces as more than an unexplained quorum timeout.

use crate::events::{EventFilter, ReportEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

/// Filtered receiver for bus events.
pub struct Subscription {
    receiver: broadcast::Receiver<ReportEvent>,
    filter: EventFilter,
    /// Events lost since the last `take_lagged`
    lagged: u64,
    /// Bus-wide loss counter
    bus_lagged: Arc<AtomicU64>,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<ReportEvent>,
        filter: EventFilter,
        bus_lagged: Arc<AtomicU64>,
    ) -> Self {
        Self {
            receiver,
            filter,
            lagged: 0,
            bus_lagged,
        }
    }

    /// Receive the next event that matches the filter.
    ///
    /// Returns `None` once the bus is dropped.
    pub async fn recv(&mut self) -> Option<ReportEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(
                        topics = ?self.filter.topics,
                        lost = count,
                        "Subscriber lagged, events lost"
                    );
                    self.lagged += count;
                    self.bus_lagged.fetch_add(count, Ordering::Relaxed);
                }
            }
        }
    }

    /// Events lost to lag since the previous call.
    pub fn take_lagged(&mut self) -> u64 {
        std::mem::take(&mut self.lagged)
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}
