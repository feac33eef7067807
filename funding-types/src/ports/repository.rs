//! Repository port trait.
//!
//! Append-only storage of funding rate observations plus the latest-per-pair
//! read path. Adapters (Postgres, SQLite) implement this trait.

use crate::domain::{FundingRate, FundingRateFilter, FundingRateRecord};
use crate::error::RepoError;

/// The repository port for funding rate observations.
#[async_trait::async_trait]
pub trait FundingRepository: Send + Sync + 'static {
    /// Persists every observation in the batch, assigning ids and creation
    /// times. Observations are validated before anything is written; an
    /// empty batch is a no-op.
    async fn create_batch(&self, rates: Vec<FundingRate>) -> Result<(), RepoError>;

    /// Returns the most recent record for each (exchange, symbol) pair that
    /// matches the filter, sorted and paginated as the filter requests.
    ///
    /// Ties on the maximum timestamp go to the later `created_at`, then the
    /// greater id.
    async fn get_latest(
        &self,
        filter: FundingRateFilter,
    ) -> Result<Vec<FundingRateRecord>, RepoError>;
}
