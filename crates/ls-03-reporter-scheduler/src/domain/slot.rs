//! Reporter rotation.
//!
//! Reporters are ordered by the ledger (reputation first) and that order is
//! never changed locally. The reporter at index `i` becomes eligible
//! `i × buffer` after the window opens and stays eligible afterwards, so a
//! silent reporter is covered by the next one.
//!
//! ```text
//! offset:  0        b        2b       3b
//!          │ A      │ A,B    │ A,B,C  │ A,B,C ...
//! ```

use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::time::Duration;

/// Position of `address` in the ledger's reporter order.
pub fn slot_index(address: &Address, reporters: &[Address]) -> Option<usize> {
    reporters.iter().position(|r| r == address)
}

pub fn is_authorized(address: &Address, reporters: &[Address]) -> bool {
    slot_index(address, reporters).is_some()
}

/// Wait before the reporter at `slot` may submit.
pub fn buffer_for(slot: usize, buffer: Duration) -> Duration {
    buffer.saturating_mul(u32::try_from(slot).unwrap_or(u32::MAX))
}

/// Index of the newest eligible reporter at `now_offset`, clamped to the last.
fn current_index(reporters_len: usize, now_offset: Duration, buffer: Duration) -> usize {
    let last = reporters_len.saturating_sub(1);
    if buffer.is_zero() {
        return last;
    }
    let elapsed = now_offset.as_nanos() / buffer.as_nanos();
    usize::try_from(elapsed).map_or(last, |i| i.min(last))
}

/// Reporter whose turn it is at `now_offset`.
pub fn current_reporter(
    reporters: &[Address],
    now_offset: Duration,
    buffer: Duration,
) -> Option<Address> {
    if reporters.is_empty() {
        return None;
    }
    Some(reporters[current_index(reporters.len(), now_offset, buffer)])
}

/// Whether `address` is eligible at `now_offset`: its turn came, or passed.
pub fn may_submit(
    address: &Address,
    reporters: &[Address],
    now_offset: Duration,
    buffer: Duration,
) -> bool {
    match slot_index(address, reporters) {
        Some(index) => index <= current_index(reporters.len(), now_offset, buffer),
        None => false,
    }
}

/// Scheduling state for one bundle, recomputed from live ledger data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterSlot {
    pub reporters: Vec<Address>,
    pub index: usize,
    pub buffer: Duration,
    pub quorum: usize,
}

impl ReporterSlot {
    /// Offset at which this slot opens.
    pub fn opens_at(&self) -> Duration {
        buffer_for(self.index, self.buffer)
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Reporters with precedence over this slot.
    pub fn ahead(&self) -> &[Address] {
        &self.reporters[..self.index.min(self.reporters.len())]
    }
}
