//! # ls-01-time-index
//!
//! Cross-validated timestamp → block height index.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Multi-source sync**: one task per chain-data source, bounded batches
//! - **Agreement**: a timestamp maps to exactly one height; any source that
//!   reports a different height halts the indexer
//! - **Confirmation lag**: the newest `confirmations` blocks are never indexed
//! - **Nearest lookup**: exact match, else the closest entry within the scan
//!   buffer (ties go to the larger height)
//!
//! ## Architecture
//!
//! ```text
//! Source A ──{number, timestamp}──┐
//! Source B ──{number, timestamp}──┼──→ Time Index (1) ──find(ts)──→ Assembler (4)
//! Source C ──{number, timestamp}──┘          │
//!                                            └── TimeIndexReady / TimeIndexFailed ──→ Bus
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! [UNINITIALIZED] ──start──→ [BOOTSTRAPPING] ──bootstrapped──→ [SYNCING {n/N}] ──all caught up──→ [READY]
//!        │                          │                                │                               │
//!        └──────────────────────────┴────── source disagreement ─────┴───────────────────────────────┘
//!                                                   │
//!                                                   ▼
//!                                               [FAILED]
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use ls_01_time_index::{InMemoryTimeIndexStore, TimeIndexConfig, TimeIndexer};
//! use ls_01_time_index::ports::inbound::TimeIndexApi;
//!
//! let indexer = Arc::new(TimeIndexer::new(
//!     TimeIndexConfig::default(),
//!     Arc::new(InMemoryTimeIndexStore::new()),
//!     start_height_resolver,
//!     vec![source_a, source_b],
//! ));
//!
//! let _tasks = indexer.start(shutdown.clone()).await?;
//! indexer.wait_ready(&shutdown).await?;
//!
//! let height = indexer.find(report_timestamp).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{FixedStartHeight, InMemoryTimeIndexStore};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbTimeIndexStore};
pub use domain::{
    merge, nearest, scan_window, Backoff, BackoffConfig, IndexerEvent, IndexerState,
    MergeOutcome, Observation, TimeIndexEntry,
};
pub use error::{TimeIndexError, TimeIndexResult};
pub use ports::inbound::TimeIndexApi;
pub use ports::outbound::{ChainDataSource, StartHeightResolver, TimeIndexStore};
pub use service::{SyncStep, TimeIndexConfig, TimeIndexer};
