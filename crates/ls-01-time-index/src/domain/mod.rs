//! Domain layer: pure time-index logic.

pub mod backoff;
pub mod entry;
pub mod lookup;
pub mod state;

pub use backoff::{Backoff, BackoffConfig};
pub use entry::{merge, MergeOutcome, Observation, TimeIndexEntry};
pub use lookup::{nearest, scan_window};
pub use state::{IndexerEvent, IndexerState};
