//! Database row types for the SQL backends.

use sqlx::FromRow;

use funding_types::{FundingRate, FundingRateId, FundingRateRecord, RepoError};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL rows
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "postgres")]
pub use pg::PgFundingRateRow;

#[cfg(feature = "postgres")]
mod pg {
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use super::*;

    /// Funding rate row as stored in PostgreSQL.
    #[derive(FromRow)]
    pub struct PgFundingRateRow {
        pub id: Uuid,
        pub exchange: String,
        pub symbol: String,
        pub price: Option<f64>,
        pub rate: f64,
        pub timestamp: DateTime<Utc>,
        pub next_funding: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
    }

    impl PgFundingRateRow {
        pub fn into_domain(self) -> Result<FundingRateRecord, RepoError> {
            let observation = FundingRate {
                exchange: self.exchange,
                symbol: self.symbol,
                price: self.price,
                rate: self.rate,
                timestamp: self.timestamp,
                next_funding: self.next_funding,
            };
            Ok(FundingRateRecord::from_parts(
                FundingRateId::from_uuid(self.id),
                observation,
                self.created_at,
            ))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite rows
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
pub use lite::{SqliteFundingRateRow, encode_timestamp};

#[cfg(feature = "sqlite")]
mod lite {
    use chrono::{DateTime, SecondsFormat, Utc};

    use super::*;

    /// Funding rate row as stored in SQLite (ids and timestamps as text).
    #[derive(FromRow)]
    pub struct SqliteFundingRateRow {
        pub id: String,
        pub exchange: String,
        pub symbol: String,
        pub price: Option<f64>,
        pub rate: f64,
        pub timestamp: String,
        pub next_funding: Option<String>,
        pub created_at: String,
    }

    /// Fixed-width UTC encoding: lexicographic order equals time order.
    pub fn encode_timestamp(ts: DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn decode_timestamp(value: &str) -> Result<DateTime<Utc>, RepoError> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepoError::Database(format!("Invalid timestamp {value:?}: {e}")))
    }

    impl SqliteFundingRateRow {
        pub fn into_domain(self) -> Result<FundingRateRecord, RepoError> {
            let id = self
                .id
                .parse::<FundingRateId>()
                .map_err(|e| RepoError::Database(format!("Invalid UUID: {}", e)))?;

            let observation = FundingRate {
                exchange: self.exchange,
                symbol: self.symbol,
                price: self.price,
                rate: self.rate,
                timestamp: decode_timestamp(&self.timestamp)?,
                next_funding: self
                    .next_funding
                    .as_deref()
                    .map(decode_timestamp)
                    .transpose()?,
            };
            Ok(FundingRateRecord::from_parts(
                id,
                observation,
                decode_timestamp(&self.created_at)?,
            ))
        }
    }

}
