//! # Report Assembler (Subsystem 4)
//!
//! Turns a bundle's time window into a signed usage report and gets it
//! accepted by the settlement ledger.
//!
//! ## Architecture
//!
//! ```text
//!                ┌─────────────── Bus (Proofs / Submissions / Ledger) ───────────────┐
//!                │                                                                   │
//!                ▼                                                                   │
//! Bundle ──→ [Time Index] ──window──→ [Usage] ──→ ReportBuilder ──→ ReportCodec ──proof──┘
//!                                                                        │
//!                                       ReporterScheduler ◄── Ledger view │
//!                                              │                          ▼
//!                                       slot wait ──→ quorum ──→ Ledger.submit_report
//! ```
//!
//! ## Reporter Slots
//!
//! Reporters are ordered by the ledger. The reporter at index `i` may submit
//! once `i × REPORT_TIME_BUFFER` has passed since its report for the bundle
//! was built and gossiped; waiting on the time index does not count. Any
//! reporter that sees an identical report already submitted by a peer
//! abstains; a divergent peer report is logged and the local one proceeds.
//!
//! ## Safety Invariants
//!
//! - A bundle is marked submitted only after the ledger acknowledged it.
//! - Proofs whose signature does not recover to the claimed address never
//!   enter the pool.
//! - Only proofs that attest the locally built report count toward quorum.
//! - Fatal codec and time-index failures raise a `CriticalError` alert.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ls_04_report_assembler::{AssemblerConfig, Bundle, ReportAssembler};
//! use ls_04_report_assembler::ports::inbound::ReportAssemblerApi;
//!
//! let assembler = Arc::new(ReportAssembler::new(
//!     AssemblerConfig::default(),
//!     signer,
//!     ledger,
//!     usage,
//!     time_index,
//!     bus.clone(),
//! ));
//!
//! tokio::spawn({
//!     let assembler = assembler.clone();
//!     let subscription = bus.subscribe(ReportAssembler::subscription_filter());
//!     async move { assembler.run_event_loop(subscription, shutdown).await }
//! });
//!
//! let outcome = assembler.run_bundle(&Bundle::new("75", from, to), &shutdown).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryLedger, LedgerStartHeight};
pub use domain::{Bundle, FeeConfig, HeightWindow, Outcome, ProofPool, ReportBuilder, UsageAggregates};
pub use error::{AssemblerError, AssemblerResult};
pub use ports::inbound::ReportAssemblerApi;
pub use ports::outbound::{
    LastReport, Ledger, LedgerError, LedgerReceipt, SystemTimeSource, TimeSource, UsageProvider,
};
pub use service::{AssemblerConfig, ReportAssembler, RetryPolicy};
