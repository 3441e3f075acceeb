//! Report Assembler → Ledger, with proofs gossiped over the bus.
//!
//! Reporters A, B, C in ledger order, quorum of two. Bundle "75" spans
//! blocks 1000..=2000.

#[cfg(test)]
mod tests {
    use crate::fixtures::{FixedClock, ReporterSet, WindowUsage};
    use ls_01_time_index::{
        FixedStartHeight, InMemoryTimeIndexStore, Observation, TimeIndexConfig, TimeIndexer,
    };
    use ls_02_report_codec::ReportCodec;
    use ls_03_reporter_scheduler::{QuorumSchedule, ReporterScheduler, SchedulerError};
    use ls_04_report_assembler::{
        AssemblerConfig, AssemblerError, Bundle, InMemoryLedger, Outcome, ReportAssembler,
        ReportAssemblerApi, ReportBuilder,
    };
    use shared_bus::{
        EventFilter, EventPublisher, EventTopic, InMemoryEventBus, ReportEvent, Shutdown,
        ShutdownController,
    };
    use shared_types::{BundleId, SourceId};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::{timeout, Instant};

    type Index = TimeIndexer<InMemoryTimeIndexStore, FixedStartHeight>;
    type Assembler = ReportAssembler<InMemoryLedger, WindowUsage, Index>;

    struct Network {
        reporters: ReporterSet,
        ledger: Arc<InMemoryLedger>,
        bus: Arc<InMemoryEventBus>,
        index: Arc<Index>,
        controller: ShutdownController,
    }

    impl Network {
        /// Both sources agree on 5000 → 1000 and 10000 → 2000.
        async fn new() -> Self {
            let reporters = ReporterSet::generate(3);
            let bus = Arc::new(InMemoryEventBus::new());
            let ledger = Arc::new(
                InMemoryLedger::new(reporters.addresses(), QuorumSchedule::fixed(2))
                    .with_publisher(bus.clone()),
            );

            let index = Arc::new(TimeIndexer::new(
                TimeIndexConfig::default(),
                Arc::new(InMemoryTimeIndexStore::new()),
                Arc::new(FixedStartHeight::default()),
                Vec::new(),
            ));
            for source in ["source1", "source2"] {
                for (timestamp, height) in [(5_000, 1_000), (10_000, 2_000)] {
                    index
                        .apply_observation(&Observation {
                            source: SourceId::new(source),
                            timestamp,
                            height,
                        })
                        .unwrap();
                }
            }
            let controller = ShutdownController::new();
            index.start(controller.handle()).await.unwrap();

            Self {
                reporters,
                ledger,
                bus,
                index,
                controller,
            }
        }

        /// Assembler for reporter `index`, wired to the bus.
        fn assembler(&self, index: usize, config: AssemblerConfig) -> Arc<Assembler> {
            let assembler = Arc::new(
                ReportAssembler::new(
                    config,
                    self.reporters.keys[index].clone(),
                    self.ledger.clone(),
                    Arc::new(WindowUsage::default()),
                    self.index.clone(),
                    self.bus.clone(),
                )
                .with_time_source(Arc::new(FixedClock(1_700_000_000_000 + index as u64))),
            );
            let subscription = self.bus.subscribe(Assembler::subscription_filter());
            tokio::spawn({
                let assembler = assembler.clone();
                let shutdown = self.controller.handle();
                async move { assembler.run_event_loop(subscription, shutdown).await }
            });
            assembler
        }
    }

    fn bundle() -> Bundle {
        Bundle::new("75", 5_000, 10_000)
    }

    fn short_quorum_wait() -> AssemblerConfig {
        AssemblerConfig {
            quorum_timeout: Duration::from_millis(200),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_two_reporters_reach_quorum_and_ledger_accepts() {
        ls_telemetry::init_test_logging();
        let net = Network::new().await;
        let mut ledger_events = net.bus.subscribe(EventFilter::topics(vec![EventTopic::Ledger]));
        let a = net.assembler(0, AssemblerConfig::default());
        let b = net.assembler(1, AssemblerConfig::default());

        let run_a = tokio::spawn({
            let a = a.clone();
            async move { a.run_bundle(&bundle(), &Shutdown::never()).await }
        });
        let run_b = tokio::spawn({
            let b = b.clone();
            async move { b.run_bundle(&bundle(), &Shutdown::never()).await }
        });

        let outcome_a = timeout(Duration::from_secs(10), run_a)
            .await
            .expect("A finished")
            .unwrap()
            .unwrap();
        let outcome_b = timeout(Duration::from_secs(10), run_b)
            .await
            .expect("B finished")
            .unwrap()
            .unwrap();

        let Outcome::Submitted { signers, hash, .. } = &outcome_a else {
            panic!("A should submit, got {:?}", outcome_a);
        };
        assert_eq!(signers.len(), 2);
        assert_eq!(
            outcome_b,
            Outcome::Abstained {
                bundle_id: BundleId::new("75"),
                hash: *hash,
                reporter: net.reporters.keys[0].address(),
            }
        );

        let accepted = net.ledger.accepted(&BundleId::new("75")).unwrap();
        assert_eq!(accepted.params.height, 2_000);

        let event = timeout(Duration::from_secs(1), ledger_events.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            event,
            ReportEvent::ReportAccepted { bundle_id } if bundle_id == BundleId::new("75")
        ));
        net.controller.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_reporter_covers_silent_first_slot() {
        let net = Network::new().await;
        let b = net.assembler(1, AssemblerConfig::default());
        let c = net.assembler(2, AssemblerConfig::default());
        let buffer = ReporterScheduler::default().buffer_for(1);
        let started = Instant::now();

        let run_b = tokio::spawn({
            let b = b.clone();
            async move {
                let outcome = b.run_bundle(&bundle(), &Shutdown::never()).await;
                (outcome, started.elapsed())
            }
        });
        let run_c = tokio::spawn({
            let c = c.clone();
            async move { c.run_bundle(&bundle(), &Shutdown::never()).await }
        });

        let (outcome_b, waited) = run_b.await.unwrap();
        let Outcome::Submitted { signers, hash, .. } = outcome_b.unwrap() else {
            panic!("B should cover the silent first reporter");
        };
        assert!(waited >= buffer);
        assert!(waited < ReporterScheduler::default().buffer_for(2));
        assert_eq!(signers.len(), 2);

        assert_eq!(
            run_c.await.unwrap().unwrap(),
            Outcome::Abstained {
                bundle_id: BundleId::new("75"),
                hash,
                reporter: net.reporters.keys[1].address(),
            }
        );
        assert_eq!(net.ledger.accepted_count(), 1);
        net.controller.shutdown();
    }

    #[tokio::test]
    async fn test_lone_reporter_misses_quorum() {
        let net = Network::new().await;
        let a = net.assembler(0, short_quorum_wait());

        let err = a
            .run_bundle(&bundle(), &Shutdown::never())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AssemblerError::Scheduler(SchedulerError::QuorumNotMet {
                signatures: 1,
                required: 2
            })
        );
        assert_eq!(net.ledger.accepted_count(), 0);
        net.controller.shutdown();
    }

    #[tokio::test]
    async fn test_forged_gossip_does_not_count_toward_quorum() {
        let net = Network::new().await;
        let a = net.assembler(0, short_quorum_wait());

        let report = ReportBuilder::default()
            .build(
                &BundleId::new("75"),
                2_000,
                &WindowUsage::aggregates(ls_04_report_assembler::HeightWindow {
                    from: 1_000,
                    to: 2_000,
                }),
            )
            .unwrap();
        let mut forged = ReportCodec::default()
            .to_proof(&report, net.reporters.keys[1].as_ref(), 1_700_000_000_500)
            .await
            .unwrap();
        forged.address = net.reporters.keys[2].address();
        net.bus
            .publish(ReportEvent::ProofGossiped {
                bundle_id: BundleId::new("75"),
                proof: forged,
            })
            .await;

        let err = a
            .run_bundle(&bundle(), &Shutdown::never())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AssemblerError::Scheduler(SchedulerError::QuorumNotMet { signatures: 1, .. })
        ));
        net.controller.shutdown();
    }

    #[tokio::test]
    async fn test_proof_for_other_report_is_ignored() {
        let net = Network::new().await;
        let a = net.assembler(0, short_quorum_wait());

        // B attests a report over a different window
        let other = ReportBuilder::default()
            .build(
                &BundleId::new("75"),
                1_999,
                &WindowUsage::aggregates(ls_04_report_assembler::HeightWindow {
                    from: 1_000,
                    to: 1_999,
                }),
            )
            .unwrap();
        let proof = ReportCodec::default()
            .to_proof(&other, net.reporters.keys[1].as_ref(), 1_700_000_000_500)
            .await
            .unwrap();
        assert!(a.receive_proof(&BundleId::new("75"), proof));

        let err = a
            .run_bundle(&bundle(), &Shutdown::never())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(!a.is_submitted(&BundleId::new("75")));
        net.controller.shutdown();
    }
}
