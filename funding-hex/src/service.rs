//! Funding Tracker Application Service
//!
//! Drives the periodic fetch/persist cycle across all exchange adapters and
//! answers latest-rate queries through the repository port.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use funding_types::{
    AppError, CancelToken, Exchange, FundingRate, FundingRateFilter, FundingRateRecord,
    FundingRepository,
};

/// Period of the secondary maintenance timer.
pub const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Lifecycle of the polling loop. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Running,
    Stopped,
}

impl TrackerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Outcome of one fetch/persist cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Valid observations gathered across adapters
    pub fetched: usize,
    /// Names of adapters whose call failed or panicked
    pub failed_exchanges: Vec<String>,
    /// Whether the batch reached the store successfully
    pub persisted: bool,
}

/// Application service for funding rate tracking.
///
/// Generic over `R: FundingRepository` so the store is injected at compile
/// time. Adapters are held as trait objects since their set is decided at
/// runtime from configuration.
pub struct TrackerService<R: FundingRepository> {
    repo: R,
    exchanges: Vec<Arc<dyn Exchange>>,
    interval: Duration,
    housekeeping_interval: Duration,
    state: AtomicU8,
    stop: CancelToken,
}

impl<R: FundingRepository> TrackerService<R> {
    /// Creates an idle tracker polling every `interval`.
    pub fn new(repo: R, exchanges: Vec<Arc<dyn Exchange>>, interval: Duration) -> Self {
        Self {
            repo,
            exchanges,
            interval,
            housekeeping_interval: HOUSEKEEPING_INTERVAL,
            state: AtomicU8::new(TrackerState::Idle as u8),
            stop: CancelToken::new(),
        }
    }

    pub fn with_housekeeping_interval(mut self, period: Duration) -> Self {
        self.housekeeping_interval = period;
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn state(&self) -> TrackerState {
        TrackerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn exchange_names(&self) -> Vec<&'static str> {
        self.exchanges.iter().map(|e| e.name()).collect()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Polling loop
    // ─────────────────────────────────────────────────────────────────────────────

    /// Runs the polling loop until [`stop`](Self::stop) is called or `cancel`
    /// fires.
    ///
    /// One cycle runs immediately, then one per interval. A tracker starts at
    /// most once; later calls log a warning and return.
    pub async fn start(&self, cancel: CancelToken) {
        if self
            .state
            .compare_exchange(
                TrackerState::Idle as u8,
                TrackerState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            tracing::warn!(state = ?self.state(), "tracker already started, ignoring start");
            return;
        }

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            exchanges = ?self.exchange_names(),
            "starting funding tracker"
        );

        if !self.should_exit(&cancel) {
            self.fetch_and_store(&cancel).await;
        }

        let now = Instant::now();
        let mut ticker = interval_at(now + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut housekeeping =
            interval_at(now + self.housekeeping_interval, self.housekeeping_interval);
        housekeeping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if self.should_exit(&cancel) {
                break;
            }

            tokio::select! {
                biased;
                _ = self.stop.cancelled() => break,
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.fetch_and_store(&cancel).await;
                }
                _ = housekeeping.tick() => {
                    self.housekeeping().await;
                }
            }
        }

        self.state.store(TrackerState::Stopped as u8, Ordering::Release);
        tracing::info!("funding tracker stopped");
    }

    /// Signals the loop to exit. Idempotent and callable from any task.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    fn should_exit(&self, cancel: &CancelToken) -> bool {
        self.stop.is_cancelled() || cancel.is_cancelled()
    }

    /// Hook for periodic maintenance such as retention. Nothing is pruned yet.
    pub async fn housekeeping(&self) {
        tracing::debug!("housekeeping tick");
    }

    /// Fetches from every adapter concurrently and persists the merged batch.
    ///
    /// Adapter and store failures are logged and reflected in the report,
    /// never returned.
    pub async fn fetch_and_store(&self, cancel: &CancelToken) -> CycleReport {
        let mut tasks = JoinSet::new();
        let mut names = HashMap::with_capacity(self.exchanges.len());
        for exchange in &self.exchanges {
            let exchange = Arc::clone(exchange);
            let name = exchange.name();
            let cancel = cancel.clone();
            let handle = tasks.spawn(async move {
                let result = exchange.fetch_funding_rates(&cancel).await;
                (exchange.name(), result)
            });
            names.insert(handle.id(), name);
        }

        let mut report = CycleReport::default();
        let mut batch: Vec<FundingRate> = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(rates))) => batch.extend(rates),
                Ok((name, Err(e))) => {
                    tracing::error!(exchange = name, error = %e, "failed to fetch funding rates");
                    report.failed_exchanges.push(name.to_string());
                }
                Err(e) => {
                    let name = names.get(&e.id()).copied().unwrap_or("unknown");
                    tracing::error!(exchange = name, error = %e, "exchange task panicked");
                    report.failed_exchanges.push(name.to_string());
                }
            }
        }

        batch.retain(|rate| match rate.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    exchange = %rate.exchange,
                    symbol = %rate.symbol,
                    error = %e,
                    "dropping invalid funding rate"
                );
                false
            }
        });
        report.fetched = batch.len();

        if batch.is_empty() {
            tracing::warn!("no funding rates fetched from any exchange");
            return report;
        }

        match self.repo.create_batch(batch).await {
            Ok(()) => {
                report.persisted = true;
                tracing::info!(count = report.fetched, "funding rates saved");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save funding rates");
            }
        }

        report
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// Latest record per (exchange, symbol) pair matching `filter`.
    pub async fn get_latest_rates(
        &self,
        filter: FundingRateFilter,
    ) -> Result<Vec<FundingRateRecord>, AppError> {
        self.repo.get_latest(filter).await.map_err(Into::into)
    }
}
