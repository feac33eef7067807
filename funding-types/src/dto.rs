//! Data Transfer Objects (DTOs) for the HTTP boundary.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{FundingRateFilter, FundingRateRecord, SortField, SortOrder};

// ─────────────────────────────────────────────────────────────────────────────
// Query DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters for `GET /api/v1/funding-rates`.
///
/// Everything arrives as text and is interpreted leniently: blank values are
/// treated as absent, non-numeric `limit`/`offset` are ignored, and unknown
/// sort fields fall back to `timestamp`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FundingRatesQuery {
    /// Restrict to one exchange
    #[param(example = "pacifica")]
    pub exchange: Option<String>,
    /// Restrict to one symbol
    #[param(example = "BTC")]
    pub symbol: Option<String>,
    /// Maximum number of records (0 = unlimited)
    pub limit: Option<String>,
    /// Number of sorted records to skip
    pub offset: Option<String>,
    /// One of rate, timestamp, symbol, exchange, price
    #[param(example = "rate")]
    pub sort_by: Option<String>,
    /// asc or desc
    #[param(example = "desc")]
    pub sort_order: Option<String>,
}

impl FundingRatesQuery {
    /// Converts the raw query into a validated filter.
    pub fn into_filter(self) -> FundingRateFilter {
        FundingRateFilter {
            exchange: non_blank(self.exchange),
            symbol: non_blank(self.symbol),
            sort_by: self
                .sort_by
                .as_deref()
                .map(SortField::parse_lenient)
                .unwrap_or_default(),
            sort_order: self
                .sort_order
                .as_deref()
                .map(SortOrder::parse_lenient)
                .unwrap_or_default(),
            limit: parse_count(self.limit),
            offset: parse_count(self.offset),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_count(value: Option<String>) -> u32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Response DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Latest rates for one symbol, keyed by exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SymbolRates {
    /// Funding rate per exchange, as a percentage
    #[schema(example = json!({"pacifica": 0.01, "lighter": 0.02}))]
    pub exchanges: BTreeMap<String, f64>,
    /// Observation time per exchange
    #[schema(value_type = BTreeMap<String, String>)]
    pub updated_at: BTreeMap<String, DateTime<Utc>>,
}

/// Response for `GET /api/v1/funding-rates`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FundingRatesResponse {
    /// Latest rates grouped by symbol
    pub data: BTreeMap<String, SymbolRates>,
    /// Number of symbols in `data`
    #[schema(example = 1)]
    pub count: usize,
}

impl FundingRatesResponse {
    /// Groups latest records by symbol. Rates are rescaled to percentages
    /// here and nowhere else.
    pub fn from_records(records: Vec<FundingRateRecord>) -> Self {
        let mut data: BTreeMap<String, SymbolRates> = BTreeMap::new();

        for record in records {
            let entry = data.entry(record.symbol).or_default();
            entry
                .exchanges
                .insert(record.exchange.clone(), record.rate * 100.0);
            entry.updated_at.insert(record.exchange, record.timestamp);
        }

        let count = data.len();
        Self { data, count }
    }
}

/// Error body returned by the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "internal server error")]
    pub error: String,
}
