//! Domain layer: rotation and quorum rules.

pub mod quorum;
pub mod slot;

pub use quorum::{tally, QuorumSchedule, QuorumTier};
pub use slot::{buffer_for, current_reporter, is_authorized, may_submit, slot_index, ReporterSlot};
