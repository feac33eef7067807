//! TrackerService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use funding_types::{
        AppError, CancelToken, Exchange, ExchangeError, FundingRate, FundingRateFilter,
        FundingRateId, FundingRateRecord, FundingRepository, RepoError,
    };

    use crate::service::{TrackerService, TrackerState};

    /// In-memory repository that records every batch it receives.
    pub struct MockRepo {
        batches: Mutex<Vec<Vec<FundingRate>>>,
        fail_writes: bool,
        fail_reads: bool,
    }

    impl MockRepo {
        pub fn new() -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
                fail_writes: false,
                fail_reads: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                fail_writes: true,
                fail_reads: true,
                ..Self::new()
            }
        }

        pub fn batches(&self) -> Vec<Vec<FundingRate>> {
            self.batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FundingRepository for MockRepo {
        async fn create_batch(&self, rates: Vec<FundingRate>) -> Result<(), RepoError> {
            if self.fail_writes {
                return Err(RepoError::Database("connection refused".into()));
            }
            self.batches.lock().unwrap().push(rates);
            Ok(())
        }

        async fn get_latest(
            &self,
            filter: FundingRateFilter,
        ) -> Result<Vec<FundingRateRecord>, RepoError> {
            if self.fail_reads {
                return Err(RepoError::Database("connection refused".into()));
            }
            let now = Utc::now();
            Ok(self
                .batches
                .lock()
                .unwrap()
                .iter()
                .flatten()
                .filter(|r| filter.exchange.as_deref().is_none_or(|e| e == r.exchange))
                .map(|r| FundingRateRecord::from_parts(FundingRateId::new(), r.clone(), now))
                .collect())
        }
    }

    enum Behavior {
        Rates(Vec<(&'static str, f64)>),
        Fail,
        Panic,
    }

    /// Scripted adapter that counts how often it was polled.
    pub struct MockExchange {
        name: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl MockExchange {
        fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Exchange for MockExchange {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch_funding_rates(
            &self,
            cancel: &CancelToken,
        ) -> Result<Vec<FundingRate>, ExchangeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if cancel.is_cancelled() {
                return Err(ExchangeError::Cancelled);
            }
            let now = Utc::now();
            match &self.behavior {
                Behavior::Rates(rates) => Ok(rates
                    .iter()
                    .map(|(symbol, rate)| FundingRate::new(self.name, *symbol, *rate, now))
                    .collect()),
                Behavior::Fail => Err(ExchangeError::Status(503)),
                Behavior::Panic => panic!("adapter blew up"),
            }
        }
    }

    fn tracker(
        repo: MockRepo,
        exchanges: &[Arc<MockExchange>],
        interval: Duration,
    ) -> TrackerService<MockRepo> {
        let exchanges = exchanges
            .iter()
            .map(|e| Arc::clone(e) as Arc<dyn Exchange>)
            .collect();
        TrackerService::new(repo, exchanges, interval)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // fetch_and_store
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_cycle_persists_union_of_successful_adapters() {
        let pacifica = MockExchange::new(
            "pacifica",
            Behavior::Rates(vec![("BTC", 0.0001), ("ETH", 0.0002)]),
        );
        let lighter = MockExchange::new("lighter", Behavior::Rates(vec![("BTC", 0.0003)]));
        let extended = MockExchange::new("extended", Behavior::Fail);
        let service = tracker(
            MockRepo::new(),
            &[pacifica, lighter, extended],
            Duration::from_secs(60),
        );

        let report = service.fetch_and_store(&CancelToken::new()).await;

        assert_eq!(report.fetched, 3);
        assert_eq!(report.failed_exchanges, vec!["extended".to_string()]);
        assert!(report.persisted);

        let batches = service.repo().batches();
        assert_eq!(batches.len(), 1);
        let mut pairs: Vec<_> = batches[0]
            .iter()
            .map(|r| (r.exchange.as_str(), r.symbol.as_str()))
            .collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![("lighter", "BTC"), ("pacifica", "BTC"), ("pacifica", "ETH")]
        );
    }

    #[tokio::test]
    async fn test_all_adapters_failing_skips_persistence() {
        let service = tracker(
            MockRepo::new(),
            &[
                MockExchange::new("pacifica", Behavior::Fail),
                MockExchange::new("lighter", Behavior::Fail),
            ],
            Duration::from_secs(60),
        );

        let report = service.fetch_and_store(&CancelToken::new()).await;

        assert_eq!(report.fetched, 0);
        assert_eq!(report.failed_exchanges.len(), 2);
        assert!(!report.persisted);
        assert!(service.repo().batches().is_empty());
    }

    #[tokio::test]
    async fn test_no_adapters_is_an_empty_cycle() {
        let service = tracker(MockRepo::new(), &[], Duration::from_secs(60));

        let report = service.fetch_and_store(&CancelToken::new()).await;

        assert_eq!(report, Default::default());
        assert!(service.repo().batches().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_adapter_is_isolated() {
        let service = tracker(
            MockRepo::new(),
            &[
                MockExchange::new("hibachi", Behavior::Panic),
                MockExchange::new("lighter", Behavior::Rates(vec![("SOL", -0.0001)])),
            ],
            Duration::from_secs(60),
        );

        let report = service.fetch_and_store(&CancelToken::new()).await;

        assert_eq!(report.failed_exchanges, vec!["hibachi".to_string()]);
        assert_eq!(report.fetched, 1);
        assert!(report.persisted);
    }

    #[tokio::test]
    async fn test_invalid_observations_are_dropped() {
        let service = tracker(
            MockRepo::new(),
            &[MockExchange::new(
                "backpack",
                Behavior::Rates(vec![("", 0.1), ("BTC", 0.2)]),
            )],
            Duration::from_secs(60),
        );

        let report = service.fetch_and_store(&CancelToken::new()).await;

        assert_eq!(report.fetched, 1);
        let batches = service.repo().batches();
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[0][0].symbol, "BTC");
    }

    #[tokio::test]
    async fn test_store_failure_is_reported_not_returned() {
        let service = tracker(
            MockRepo::failing(),
            &[MockExchange::new("pacifica", Behavior::Rates(vec![("BTC", 0.1)]))],
            Duration::from_secs(60),
        );

        let report = service.fetch_and_store(&CancelToken::new()).await;

        assert_eq!(report.fetched, 1);
        assert!(report.failed_exchanges.is_empty());
        assert!(!report.persisted);
    }

    #[tokio::test]
    async fn test_cancelled_cycle_persists_nothing() {
        let service = tracker(
            MockRepo::new(),
            &[MockExchange::new("pacifica", Behavior::Rates(vec![("BTC", 0.1)]))],
            Duration::from_secs(60),
        );
        let cancel = CancelToken::new();
        cancel.cancel();

        let report = service.fetch_and_store(&cancel).await;

        assert_eq!(report.failed_exchanges, vec!["pacifica".to_string()]);
        assert!(service.repo().batches().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_start_polls_immediately_then_every_interval() {
        let exchange = MockExchange::new("pacifica", Behavior::Rates(vec![("BTC", 0.1)]));
        let service = Arc::new(tracker(
            MockRepo::new(),
            &[exchange.clone()],
            Duration::from_secs(60),
        ));

        let runner = Arc::clone(&service);
        let handle = tokio::spawn(async move { runner.start(CancelToken::new()).await });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(service.state(), TrackerState::Running);
        assert_eq!(exchange.calls(), 1);

        tokio::time::sleep(Duration::from_secs(150)).await;
        assert_eq!(exchange.calls(), 3);

        service.stop();
        handle.await.unwrap();

        assert_eq!(service.state(), TrackerState::Stopped);
        assert_eq!(service.repo().batches().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_token_ends_loop() {
        let exchange = MockExchange::new("lighter", Behavior::Rates(vec![("ETH", 0.1)]));
        let service = Arc::new(tracker(
            MockRepo::new(),
            &[exchange.clone()],
            Duration::from_secs(60),
        ));
        let cancel = CancelToken::new();

        let runner = Arc::clone(&service);
        let token = cancel.clone();
        let handle = tokio::spawn(async move { runner.start(token).await });

        tokio::time::sleep(Duration::from_secs(30)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(service.state(), TrackerState::Stopped);
        assert_eq!(exchange.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_ignored() {
        let exchange = MockExchange::new("pacifica", Behavior::Rates(vec![("BTC", 0.1)]));
        let service = Arc::new(tracker(
            MockRepo::new(),
            &[exchange.clone()],
            Duration::from_secs(60),
        ));

        let runner = Arc::clone(&service);
        let handle = tokio::spawn(async move { runner.start(CancelToken::new()).await });
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Returns at once instead of running a second loop.
        service.start(CancelToken::new()).await;
        assert_eq!(exchange.calls(), 1);

        service.stop();
        handle.await.unwrap();

        service.start(CancelToken::new()).await;
        assert_eq!(service.state(), TrackerState::Stopped);
        assert_eq!(exchange.calls(), 1);
    }

    #[tokio::test]
    async fn test_stop_before_start_skips_polling() {
        let exchange = MockExchange::new("pacifica", Behavior::Rates(vec![("BTC", 0.1)]));
        let service = tracker(MockRepo::new(), &[exchange.clone()], Duration::from_secs(60));

        service.stop();
        service.stop();
        service.start(CancelToken::new()).await;

        assert_eq!(service.state(), TrackerState::Stopped);
        assert_eq!(exchange.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent_while_running() {
        let service = Arc::new(tracker(MockRepo::new(), &[], Duration::from_secs(60)));

        let runner = Arc::clone(&service);
        let handle = tokio::spawn(async move { runner.start(CancelToken::new()).await });
        tokio::time::sleep(Duration::from_secs(1)).await;

        service.stop();
        service.stop();
        handle.await.unwrap();
        service.stop();

        assert_eq!(service.state(), TrackerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_housekeeping_does_not_poll() {
        let exchange = MockExchange::new("pacifica", Behavior::Rates(vec![("BTC", 0.1)]));
        let service = Arc::new(
            tracker(MockRepo::new(), &[exchange.clone()], Duration::from_secs(3600))
                .with_housekeeping_interval(Duration::from_secs(10)),
        );

        let runner = Arc::clone(&service);
        let handle = tokio::spawn(async move { runner.start(CancelToken::new()).await });
        tokio::time::sleep(Duration::from_secs(35)).await;

        assert_eq!(exchange.calls(), 1);
        assert_eq!(service.state(), TrackerState::Running);

        service.stop();
        handle.await.unwrap();
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_get_latest_rates_delegates_filter() {
        let service = tracker(
            MockRepo::new(),
            &[
                MockExchange::new("pacifica", Behavior::Rates(vec![("BTC", 0.1)])),
                MockExchange::new("lighter", Behavior::Rates(vec![("BTC", 0.2)])),
            ],
            Duration::from_secs(60),
        );
        service.fetch_and_store(&CancelToken::new()).await;

        let records = service
            .get_latest_rates(FundingRateFilter::default().with_exchange("lighter"))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].exchange, "lighter");
        assert_eq!(records[0].rate, 0.2);
    }

    #[tokio::test]
    async fn test_get_latest_rates_maps_store_failure_to_internal() {
        let service = tracker(MockRepo::failing(), &[], Duration::from_secs(60));

        let result = service.get_latest_rates(FundingRateFilter::default()).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
