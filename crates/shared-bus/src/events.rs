//! # Report Events
//!
//! Defines all event types that flow through the shared bus: proof gossip,
//! peer submissions observed on the ledger, ledger settlement events,
//! time-index lifecycle signals and operator alerts.

use serde::{Deserialize, Serialize};
use shared_types::entities::{Address, BundleId, Hash, ProofOfReport, Timestamp};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportEvent {
    // =========================================================================
    // TIME INDEX
    // =========================================================================
    /// Every chain-data source caught up at least once.
    TimeIndexReady {
        /// Newest indexed timestamp, if any.
        latest_timestamp: Option<Timestamp>,
    },

    /// The indexer halted (irreconcilable source disagreement).
    TimeIndexFailed {
        /// Human-readable cause.
        reason: String,
    },

    // =========================================================================
    // REPORT ASSEMBLY
    // =========================================================================
    /// A node's `ProofOfReport` for a bundle, gossiped to peers.
    ProofGossiped {
        /// Bundle the proof attests.
        bundle_id: BundleId,
        /// The proof itself.
        proof: ProofOfReport,
    },

    // =========================================================================
    // LEDGER
    // =========================================================================
    /// A report submission for a bundle was observed (possibly from a peer).
    ReportSubmitted {
        /// Bundle the submission covers.
        bundle_id: BundleId,
        /// Submitting reporter.
        reporter: Address,
        /// Canonical hash of the submitted report.
        hash: Hash,
    },

    /// The ledger accepted the report for a bundle.
    ReportAccepted {
        /// Accepted bundle.
        bundle_id: BundleId,
    },

    /// The ledger finished settling the report for a bundle.
    ReportProcessed {
        /// Processed bundle.
        bundle_id: BundleId,
    },

    // =========================================================================
    // ALERTS
    // =========================================================================
    /// Fatal condition that halts processing until an operator steps in.
    CriticalError {
        /// Component that stopped, e.g. `time-index`.
        component: String,
        /// Bundle being processed, if the failure is tied to one.
        bundle_id: Option<BundleId>,
        /// Error description.
        error: String,
    },
}

impl ReportEvent {
    /// Operator alert raised by `component`.
    pub fn critical(
        component: impl Into<String>,
        bundle_id: Option<BundleId>,
        error: impl ToString,
    ) -> Self {
        Self::CriticalError {
            component: component.into(),
            bundle_id,
            error: error.to_string(),
        }
    }

    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TimeIndexReady { .. } | Self::TimeIndexFailed { .. } => EventTopic::TimeIndex,
            Self::ProofGossiped { .. } => EventTopic::Proofs,
            Self::ReportSubmitted { .. } => EventTopic::Submissions,
            Self::ReportAccepted { .. } | Self::ReportProcessed { .. } => EventTopic::Ledger,
            Self::CriticalError { .. } => EventTopic::Alerts,
        }
    }

    /// Bundle this event refers to, if any.
    #[must_use]
    pub fn bundle_id(&self) -> Option<&BundleId> {
        match self {
            Self::ProofGossiped { bundle_id, .. }
            | Self::ReportSubmitted { bundle_id, .. }
            | Self::ReportAccepted { bundle_id }
            | Self::ReportProcessed { bundle_id } => Some(bundle_id),
            Self::CriticalError { bundle_id, .. } => bundle_id.as_ref(),
            _ => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Time index lifecycle.
    TimeIndex,
    /// Proof gossip between reporters.
    Proofs,
    /// Report submissions seen on the ledger.
    Submissions,
    /// Ledger settlement events.
    Ledger,
    /// Operator alerts.
    Alerts,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &ReportEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
