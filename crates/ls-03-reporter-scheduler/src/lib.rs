//! # ls-03-reporter-scheduler
//!
//! Decides whether and when the local node may submit a report.
//!
//! ## Overview
//!
//! - **Rotation**: the ledger's reporter order, slot `i` opens at `i × buffer`
//! - **Fallback**: earlier reporters stay eligible once their slot opened
//! - **Authorization**: unlisted → `InvalidReporter`, under-staked → `StakeRequired`
//! - **Quorum**: thresholds are looked up in the ledger's `QuorumSchedule`;
//!   too few distinct reporter signatures → `QuorumNotMet`
//!
//! The scheduler holds no ledger state. Callers pass a fresh `LedgerView` to
//! every decision.

pub mod domain;
pub mod error;
pub mod service;

pub use domain::{
    buffer_for, current_reporter, is_authorized, may_submit, slot_index, tally, QuorumSchedule,
    QuorumTier, ReporterSlot,
};
pub use error::{SchedulerError, SchedulerResult};
pub use service::{LedgerView, ReporterScheduler, SchedulerConfig, SubmissionPlan};
