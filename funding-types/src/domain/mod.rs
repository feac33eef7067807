//! Domain models for the funding rate tracker.

pub mod filter;
pub mod funding_rate;

pub use filter::{FundingRateFilter, SortField, SortOrder};
pub use funding_rate::{FundingRate, FundingRateId, FundingRateRecord};
