//! Chain sources → Time Index.

#[cfg(test)]
mod tests {
    use crate::fixtures::ScriptedSource;
    use ls_01_time_index::{
        BackoffConfig, FixedStartHeight, InMemoryTimeIndexStore, IndexerState, TimeIndexApi,
        TimeIndexConfig, TimeIndexError, TimeIndexer,
    };
    use shared_bus::{
        EventFilter, EventTopic, InMemoryEventBus, ReportEvent, Shutdown, ShutdownController,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    type Indexer = TimeIndexer<InMemoryTimeIndexStore, FixedStartHeight>;

    /// Block n carries timestamp n * 100 + 800, so block 42 is at 5000.
    fn timestamp_of(n: u64) -> u64 {
        n * 100 + 800
    }

    fn config() -> TimeIndexConfig {
        TimeIndexConfig {
            confirmations: 2,
            scan_buffer: 10_000,
            poll_interval: Duration::from_secs(3600),
            batch_size: 16,
            backoff: BackoffConfig {
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                multiplier: 2,
            },
        }
    }

    fn indexer(sources: Vec<Arc<dyn ls_01_time_index::ChainDataSource>>, bus: Arc<InMemoryEventBus>) -> Arc<Indexer> {
        Arc::new(
            TimeIndexer::new(
                config(),
                Arc::new(InMemoryTimeIndexStore::new()),
                Arc::new(FixedStartHeight {
                    last_report_height: None,
                    genesis_height: 30,
                }),
                sources,
            )
            .with_publisher(bus),
        )
    }

    #[tokio::test]
    async fn test_agreeing_sources_make_index_ready() {
        ls_telemetry::init_test_logging();
        let bus = Arc::new(InMemoryEventBus::new());
        let mut events = bus.subscribe(EventFilter::topics(vec![EventTopic::TimeIndex]));
        let indexer = indexer(
            vec![
                ScriptedSource::new("source1", 60, timestamp_of).shared(),
                ScriptedSource::new("source2", 60, timestamp_of).shared(),
            ],
            bus.clone(),
        );

        let controller = ShutdownController::new();
        let handles = indexer.start(controller.handle()).await.unwrap();
        timeout(Duration::from_secs(2), indexer.wait_ready(&Shutdown::never()))
            .await
            .expect("ready in time")
            .unwrap();

        let entry = indexer.find_entry(5000).await.unwrap();
        assert_eq!(entry.height, 42);
        assert_eq!(entry.agreeing_sources(), 2);

        // Between blocks 42 (5000) and 43 (5100), closer to 42
        assert_eq!(indexer.find(5049).await.unwrap(), 42);
        assert_eq!(indexer.find(5051).await.unwrap(), 43);
        // Blocks above head - confirmations are never indexed
        assert_eq!(
            indexer.latest_timestamp().await.unwrap(),
            Some(timestamp_of(58))
        );

        let event = timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, ReportEvent::TimeIndexReady { .. }));

        controller.shutdown();
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_disagreeing_sources_halt_the_index() {
        let bus = Arc::new(InMemoryEventBus::new());
        let mut events = bus.subscribe(EventFilter::topics(vec![EventTopic::TimeIndex]));
        let indexer = indexer(
            vec![
                ScriptedSource::new("source1", 60, timestamp_of).shared(),
                ScriptedSource::new("source2", 60, timestamp_of)
                    .with_block(42, 4_990)
                    .with_block(43, 5_000)
                    .shared(),
            ],
            bus.clone(),
        );

        let controller = ShutdownController::new();
        let handles = indexer.start(controller.handle()).await.unwrap();

        let result = timeout(Duration::from_secs(2), indexer.wait_ready(&Shutdown::never()))
            .await
            .expect("settled in time");
        assert!(matches!(result, Err(TimeIndexError::Failed { .. })));
        assert!(matches!(indexer.state(), IndexerState::Failed { .. }));
        assert!(matches!(
            indexer.find(5000).await,
            Err(TimeIndexError::Failed { .. })
        ));

        let event = timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, ReportEvent::TimeIndexFailed { .. }));

        controller.shutdown();
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_restart_resumes_from_persisted_cursor() {
        let store = Arc::new(InMemoryTimeIndexStore::new());
        let start = |store: Arc<InMemoryTimeIndexStore>, head: u64| {
            Arc::new(TimeIndexer::new(
                config(),
                store,
                Arc::new(FixedStartHeight {
                    last_report_height: None,
                    genesis_height: 30,
                }),
                vec![ScriptedSource::new("source1", head, timestamp_of).shared()],
            ))
        };

        let first = start(store.clone(), 40);
        let controller = ShutdownController::new();
        let handles = first.start(controller.handle()).await.unwrap();
        first.wait_ready(&Shutdown::never()).await.unwrap();
        controller.shutdown();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(first.latest_timestamp().await.unwrap(), Some(timestamp_of(38)));

        let source = Arc::new(ScriptedSource::new("source1", 60, timestamp_of));
        let second = Arc::new(TimeIndexer::new(
            config(),
            store,
            Arc::new(FixedStartHeight::default()),
            vec![source.clone() as Arc<dyn ls_01_time_index::ChainDataSource>],
        ));
        let controller = ShutdownController::new();
        let handles = second.start(controller.handle()).await.unwrap();
        second.wait_ready(&Shutdown::never()).await.unwrap();

        assert_eq!(source.requests.lock().first().map(|r| r.0), Some(39));
        assert_eq!(second.find(timestamp_of(50)).await.unwrap(), 50);

        controller.shutdown();
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
