//! Time-index start height read from the ledger.

use crate::ports::outbound::{Ledger, LedgerError};
use async_trait::async_trait;
use ls_01_time_index::{StartHeightResolver, TimeIndexError, TimeIndexResult};
use shared_types::BlockHeight;
use std::sync::Arc;

fn unresolved(e: LedgerError) -> TimeIndexError {
    TimeIndexError::StartHeightUnresolved {
        reason: e.to_string(),
    }
}

/// Resolves the index start from the last accepted report or the genesis block.
pub struct LedgerStartHeight<L: Ledger> {
    ledger: Arc<L>,
}

impl<L: Ledger> LedgerStartHeight<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl<L: Ledger + 'static> StartHeightResolver for LedgerStartHeight<L> {
    async fn last_report_height(&self) -> TimeIndexResult<Option<BlockHeight>> {
        let last = self.ledger.last_report().await.map_err(unresolved)?;
        Ok(last.map(|report| report.height))
    }

    async fn genesis_height(&self) -> TimeIndexResult<BlockHeight> {
        self.ledger.start_block_number().await.map_err(unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryLedger;
    use crate::ports::outbound::LastReport;
    use ls_03_reporter_scheduler::QuorumSchedule;
    use shared_types::BundleId;

    #[tokio::test]
    async fn test_reads_last_report_then_genesis() {
        let ledger = Arc::new(InMemoryLedger::new(Vec::new(), QuorumSchedule::fixed(1)).with_start_block(77));
        let resolver = LedgerStartHeight::new(ledger.clone());

        assert_eq!(resolver.last_report_height().await.unwrap(), None);
        assert_eq!(resolver.genesis_height().await.unwrap(), 77);

        ledger.set_last_report(LastReport {
            id: BundleId::new("74"),
            height: 900,
        });
        assert_eq!(resolver.last_report_height().await.unwrap(), Some(900));
    }

    #[tokio::test]
    async fn test_ledger_failure_is_retryable_for_indexer() {
        let ledger = Arc::new(InMemoryLedger::new(Vec::new(), QuorumSchedule::fixed(1)));
        ledger.fail_next(1);
        let resolver = LedgerStartHeight::new(ledger);

        let err = resolver.genesis_height().await.unwrap_err();
        assert!(err.is_retryable());
    }
}
