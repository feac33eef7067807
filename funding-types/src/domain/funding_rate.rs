//! Funding rate domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::DomainError;

/// Unique identifier for a stored funding rate observation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct FundingRateId(Uuid);

impl FundingRateId {
    /// Creates a new random FundingRateId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a FundingRateId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for FundingRateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FundingRateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for FundingRateId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One funding rate observation, as produced by an exchange adapter.
///
/// Not yet persisted: the store assigns `id` and `created_at` when it turns
/// this into a [`FundingRateRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRate {
    /// Venue identifier (e.g. "pacifica")
    pub exchange: String,
    /// Base-asset ticker with venue suffixes stripped (e.g. "BTC")
    pub symbol: String,
    /// Mark or oracle price, when the venue reports one
    pub price: Option<f64>,
    /// Funding rate as a decimal fraction, not a percentage
    pub rate: f64,
    /// When the adapter observed the rate
    pub timestamp: DateTime<Utc>,
    /// Next funding settlement, when known
    pub next_funding: Option<DateTime<Utc>>,
}

impl FundingRate {
    /// Creates an observation without price or next funding time.
    pub fn new(
        exchange: impl Into<String>,
        symbol: impl Into<String>,
        rate: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            exchange: exchange.into(),
            symbol: symbol.into(),
            price: None,
            rate,
            timestamp,
            next_funding: None,
        }
    }

    /// Sets the reported price.
    pub fn with_price(mut self, price: Option<f64>) -> Self {
        self.price = price;
        self
    }

    /// Sets the next funding settlement time.
    pub fn with_next_funding(mut self, next_funding: DateTime<Utc>) -> Self {
        self.next_funding = Some(next_funding);
        self
    }

    /// Checks the invariants every persisted record must satisfy.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.exchange.trim().is_empty() {
            return Err(DomainError::EmptyExchange);
        }
        if self.symbol.trim().is_empty() {
            return Err(DomainError::EmptySymbol {
                exchange: self.exchange.clone(),
            });
        }
        Ok(())
    }
}

/// A persisted funding rate observation. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FundingRateRecord {
    pub id: FundingRateId,
    #[schema(example = "pacifica")]
    pub exchange: String,
    #[schema(example = "BTC")]
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[schema(example = 0.0001)]
    pub rate: f64,
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub next_funding: Option<DateTime<Utc>>,
    #[schema(value_type = String, example = "2024-01-01T00:00:01Z")]
    pub created_at: DateTime<Utc>,
}

impl FundingRateRecord {
    /// Builds a record from an observation and the store-assigned fields.
    pub fn from_parts(id: FundingRateId, rate: FundingRate, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            exchange: rate.exchange,
            symbol: rate.symbol,
            price: rate.price,
            rate: rate.rate,
            timestamp: rate.timestamp,
            next_funding: rate.next_funding,
            created_at,
        }
    }
}
