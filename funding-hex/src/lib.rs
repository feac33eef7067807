//! # Funding Hex
//!
//! Application service layer and HTTP adapter for the funding rate tracker.
//!
//! ## Architecture
//!
//! - `service/` - Tracker service (polling loop, fetch/persist cycle, queries)
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The service is generic over `R: FundingRepository`, allowing
//! different repository implementations to be injected. Exchange adapters
//! are trait objects chosen at runtime.

pub mod inbound;
pub mod openapi;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use service::{CycleReport, TrackerService, TrackerState};
