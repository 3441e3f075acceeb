//! End to end: ledger genesis → time index sync → report submission → restart.

#[cfg(test)]
mod tests {
    use crate::fixtures::{FixedClock, ReporterSet, ScriptedSource, WindowUsage};
    use ls_01_time_index::{
        BackoffConfig, ChainDataSource, InMemoryTimeIndexStore, TimeIndexApi, TimeIndexConfig,
        TimeIndexer,
    };
    use ls_03_reporter_scheduler::{QuorumSchedule, QuorumTier};
    use ls_04_report_assembler::{
        AssemblerConfig, Bundle, HeightWindow, InMemoryLedger, Ledger, LedgerStartHeight,
        Outcome, ReportAssembler, ReportAssemblerApi,
    };
    use shared_bus::{InMemoryEventBus, Shutdown, ShutdownController};
    use shared_types::BundleId;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    type Index = TimeIndexer<InMemoryTimeIndexStore, LedgerStartHeight<InMemoryLedger>>;

    fn timestamp_of(n: u64) -> u64 {
        n * 100 + 800
    }

    fn config() -> TimeIndexConfig {
        TimeIndexConfig {
            confirmations: 2,
            scan_buffer: 10_000,
            poll_interval: Duration::from_secs(3600),
            batch_size: 8,
            backoff: BackoffConfig {
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                multiplier: 2,
            },
        }
    }

    fn sources() -> Vec<Arc<dyn ChainDataSource>> {
        vec![
            ScriptedSource::new("source1", 60, timestamp_of).shared(),
            ScriptedSource::new("source2", 60, timestamp_of).shared(),
        ]
    }

    #[tokio::test]
    async fn test_single_reporter_network_settles_bundle() {
        ls_telemetry::init_test_logging();
        let reporters = ReporterSet::generate(1);
        let bus = Arc::new(InMemoryEventBus::new());
        // Fewer than 5 active nodes needs one signature, more needs two
        let schedule = QuorumSchedule::new(vec![
            QuorumTier {
                min_active_nodes: 0,
                required_signatures: 1,
            },
            QuorumTier {
                min_active_nodes: 5,
                required_signatures: 2,
            },
        ])
        .unwrap();
        let ledger = Arc::new(
            InMemoryLedger::new(reporters.addresses(), schedule)
                .with_publisher(bus.clone())
                .with_start_block(30),
        );

        let index: Arc<Index> = Arc::new(
            TimeIndexer::new(
                config(),
                Arc::new(InMemoryTimeIndexStore::new()),
                Arc::new(LedgerStartHeight::new(ledger.clone())),
                sources(),
            )
            .with_publisher(bus.clone()),
        );
        let controller = ShutdownController::new();
        let handles = index.start(controller.handle()).await.unwrap();

        let usage = Arc::new(WindowUsage::default());
        let assembler = ReportAssembler::new(
            AssemblerConfig::default(),
            reporters.keys[0].clone(),
            ledger.clone(),
            usage.clone(),
            index.clone(),
            bus.clone(),
        )
        .with_time_source(Arc::new(FixedClock(1_700_000_000_000)));

        // Blocks 32 (4000) through 42 (5000)
        let outcome = timeout(
            Duration::from_secs(5),
            assembler.run_bundle(&Bundle::new("75", 4_000, 5_000), &Shutdown::never()),
        )
        .await
        .expect("bundle finished")
        .unwrap();

        assert!(matches!(outcome, Outcome::Submitted { ref signers, .. } if signers.len() == 1));
        assert_eq!(
            *usage.windows.lock(),
            vec![HeightWindow { from: 32, to: 42 }]
        );
        let last = ledger.last_report().await.unwrap().unwrap();
        assert_eq!(last.id, BundleId::new("75"));
        assert_eq!(last.height, 42);

        controller.shutdown();
        for handle in handles {
            handle.await.unwrap();
        }

        // A fresh index picks up where the ledger's last report left off
        let fresh: Arc<Index> = Arc::new(TimeIndexer::new(
            config(),
            Arc::new(InMemoryTimeIndexStore::new()),
            Arc::new(LedgerStartHeight::new(ledger.clone())),
            sources(),
        ));
        assert_eq!(fresh.resolve_start_height().await.unwrap(), 42);
        assert!(!fresh.is_ready());
    }

    #[tokio::test]
    async fn test_growing_network_raises_quorum() {
        let reporters = ReporterSet::generate(2);
        let schedule = QuorumSchedule::new(vec![
            QuorumTier {
                min_active_nodes: 0,
                required_signatures: 1,
            },
            QuorumTier {
                min_active_nodes: 5,
                required_signatures: 2,
            },
        ])
        .unwrap();
        let ledger = Arc::new(InMemoryLedger::new(reporters.addresses(), schedule));
        ledger.set_total_nodes(8);

        let index: Arc<Index> = Arc::new(TimeIndexer::new(
            config(),
            Arc::new(InMemoryTimeIndexStore::new()),
            Arc::new(LedgerStartHeight::new(ledger.clone())),
            sources(),
        ));
        let controller = ShutdownController::new();
        let handles = index.start(controller.handle()).await.unwrap();

        let assembler = ReportAssembler::new(
            AssemblerConfig {
                quorum_timeout: Duration::from_millis(100),
                ..Default::default()
            },
            reporters.keys[0].clone(),
            ledger.clone(),
            Arc::new(WindowUsage::default()),
            index.clone(),
            Arc::new(InMemoryEventBus::new()),
        );

        let err = assembler
            .run_bundle(&Bundle::new("75", 4_000, 5_000), &Shutdown::never())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "quorum_not_met");
        assert!(!assembler.is_submitted(&BundleId::new("75")));
        assert_eq!(ledger.accepted_count(), 0);

        controller.shutdown();
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
