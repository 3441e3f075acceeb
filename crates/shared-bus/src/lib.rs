//! # Shared Bus - Event Bus for Inter-Subsystem Communication
//!
//! Carries proof gossip, observed submissions, ledger settlement events,
//! time-index lifecycle signals and operator alerts between the report
//! subsystems.
//!
//! ## Choreography Pattern
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Time Index   │                    │  Assembler   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Cancellation
//!
//! `ShutdownController` / `Shutdown` provide the cooperative cancellation
//! signal every long-running wait selects on.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod shutdown;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, ReportEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use shutdown::{Shutdown, ShutdownController};
pub use subscriber::Subscription;

/// Events buffered per subscriber before the oldest are lost.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
