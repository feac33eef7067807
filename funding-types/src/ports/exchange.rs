//! Exchange adapter port.
//!
//! One implementation per venue. Each translates the venue's API response
//! into normalized [`FundingRate`] observations.

use crate::cancel::CancelToken;
use crate::domain::FundingRate;
use crate::error::ExchangeError;

/// Port trait for funding rate sources.
///
/// Implementations hold no shared mutable state and must be safe to call
/// concurrently and repeatedly.
#[async_trait::async_trait]
pub trait Exchange: Send + Sync {
    /// Stable lowercase venue identifier, persisted as the record's exchange.
    fn name(&self) -> &'static str;

    /// Fetches the current funding rates from the venue.
    ///
    /// An already-cancelled token fails with [`ExchangeError::Cancelled`]
    /// before any request is sent; cancelling mid-flight aborts the request
    /// with the same error. The call is all-or-nothing: either the full list
    /// of observations or one error.
    async fn fetch_funding_rates(
        &self,
        cancel: &CancelToken,
    ) -> Result<Vec<FundingRate>, ExchangeError>;
}
