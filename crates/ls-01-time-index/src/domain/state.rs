//! Indexer lifecycle state machine.
//!
//! ```text
//! [UNINITIALIZED] ──start──→ [BOOTSTRAPPING] ──bootstrapped{n}──→ [SYNCING {0, n}]
//!                                                                      │
//!                                            source caught up (×n) ────┴──→ [READY]
//!
//! any state ──source disagreement──→ [FAILED]   (terminal, operator intervention)
//! ```

use serde::{Deserialize, Serialize};

/// Indexer lifecycle state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexerState {
    #[default]
    Uninitialized,
    /// Resolving the start height
    Bootstrapping,
    /// `synced` of `total` sources have caught up at least once
    Syncing { synced: usize, total: usize },
    /// Every source caught up at least once
    Ready,
    /// Irreconcilable disagreement; lookups refused
    Failed { reason: String },
}

/// Events that drive state transitions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexerEvent {
    Start,
    Bootstrapped { total_sources: usize },
    /// A source reported "nothing further to sync" for the first time
    SourceCaughtUp,
    SourceDisagreement { reason: String },
}

impl IndexerState {
    /// Pure, deterministic transition function.
    pub fn next_state(&self, event: &IndexerEvent) -> IndexerState {
        match (self, event) {
            (IndexerState::Failed { .. }, _) => self.clone(),

            (_, IndexerEvent::SourceDisagreement { reason }) => IndexerState::Failed {
                reason: reason.clone(),
            },

            (IndexerState::Uninitialized, IndexerEvent::Start) => IndexerState::Bootstrapping,

            (IndexerState::Bootstrapping, IndexerEvent::Bootstrapped { total_sources: 0 }) => {
                IndexerState::Ready
            }
            (IndexerState::Bootstrapping, IndexerEvent::Bootstrapped { total_sources }) => {
                IndexerState::Syncing {
                    synced: 0,
                    total: *total_sources,
                }
            }

            (IndexerState::Syncing { synced, total }, IndexerEvent::SourceCaughtUp) => {
                let synced = synced + 1;
                if synced >= *total {
                    IndexerState::Ready
                } else {
                    IndexerState::Syncing {
                        synced,
                        total: *total,
                    }
                }
            }

            // Everything else leaves the state unchanged
            _ => self.clone(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, IndexerState::Ready)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, IndexerState::Failed { .. })
    }

    /// Ready or Failed; no further progress without a restart.
    pub fn is_settled(&self) -> bool {
        self.is_ready() || self.is_failed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let state = IndexerState::default()
            .next_state(&IndexerEvent::Start)
            .next_state(&IndexerEvent::Bootstrapped { total_sources: 2 });
        assert_eq!(state, IndexerState::Syncing { synced: 0, total: 2 });

        let state = state.next_state(&IndexerEvent::SourceCaughtUp);
        assert_eq!(state, IndexerState::Syncing { synced: 1, total: 2 });

        let state = state.next_state(&IndexerEvent::SourceCaughtUp);
        assert!(state.is_ready());
    }

    #[test]
    fn test_no_sources_is_immediately_ready() {
        let state = IndexerState::Bootstrapping
            .next_state(&IndexerEvent::Bootstrapped { total_sources: 0 });
        assert!(state.is_ready());
    }

    #[test]
    fn test_disagreement_fails_from_any_state() {
        let event = IndexerEvent::SourceDisagreement {
            reason: "conflict".into(),
        };
        for state in [
            IndexerState::Uninitialized,
            IndexerState::Bootstrapping,
            IndexerState::Syncing { synced: 1, total: 2 },
            IndexerState::Ready,
        ] {
            assert!(state.next_state(&event).is_failed());
        }
    }

    #[test]
    fn test_failed_is_terminal() {
        let failed = IndexerState::Failed {
            reason: "conflict".into(),
        };
        assert_eq!(failed.next_state(&IndexerEvent::SourceCaughtUp), failed);
        assert_eq!(failed.next_state(&IndexerEvent::Start), failed);
    }

    #[test]
    fn test_ready_ignores_late_catch_up() {
        assert_eq!(
            IndexerState::Ready.next_state(&IndexerEvent::SourceCaughtUp),
            IndexerState::Ready
        );
    }
}
