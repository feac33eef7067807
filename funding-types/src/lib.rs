//! # Funding Types
//!
//! Domain types and port traits for the funding rate tracker.
//! This crate has no IO of its own - only data structures, invariants,
//! trait definitions and the shared cancellation token.
//!
//! ## Architecture
//!
//! - `domain/` - Funding rate observations, stored records, query filter
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - HTTP response shapes
//! - `error/` - Domain, adapter, repository and application errors

pub mod cancel;
pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use cancel::CancelToken;
pub use domain::{
    FundingRate, FundingRateFilter, FundingRateId, FundingRateRecord, SortField, SortOrder,
};
pub use dto::*;
pub use error::{AppError, DomainError, ExchangeError, RepoError};
pub use ports::{Exchange, FundingRepository};
