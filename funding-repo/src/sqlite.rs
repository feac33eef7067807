//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use funding_types::{
    FundingRate, FundingRateFilter, FundingRateRecord, FundingRepository, RepoError,
};

use crate::query::{COLUMNS, LATEST_FIRST, order_by_clause, push_pair_filters};
use crate::types::{SqliteFundingRateRow, encode_timestamp};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every in-memory connection is its own database, so keep exactly one alive.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePool::connect_with(options).await?
        };

        let ddl = include_str!("../migrations/0001_create_funding_rates.sql");
        sqlx::query(ddl).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl FundingRepository for SqliteRepo {
    async fn create_batch(&self, rates: Vec<FundingRate>) -> Result<(), RepoError> {
        if rates.is_empty() {
            return Ok(());
        }
        for rate in &rates {
            rate.validate()?;
        }

        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let now = encode_timestamp(chrono::Utc::now());

        for (index, rate) in rates.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO funding_rates (id, exchange, symbol, price, rate, timestamp, next_funding, created_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&rate.exchange)
            .bind(&rate.symbol)
            .bind(rate.price)
            .bind(rate.rate)
            .bind(encode_timestamp(rate.timestamp))
            .bind(rate.next_funding.map(encode_timestamp))
            .bind(&now)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(format!("batch insert at index {}: {}", index, e)))?;
        }

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        tracing::debug!(count = rates.len(), "stored funding rate batch");
        Ok(())
    }

    async fn get_latest(
        &self,
        filter: FundingRateFilter,
    ) -> Result<Vec<FundingRateRecord>, RepoError> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {COLUMNS} FROM (SELECT {COLUMNS}, ROW_NUMBER() OVER \
             (PARTITION BY exchange, symbol ORDER BY {LATEST_FIRST}) AS pair_rank \
             FROM funding_rates WHERE 1 = 1"
        ));
        push_pair_filters(&mut qb, &filter);
        qb.push(") AS latest WHERE pair_rank = 1");
        qb.push(order_by_clause(&filter));

        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
        if filter.limit > 0 {
            qb.push(" LIMIT ").push_bind(i64::from(filter.limit));
        } else if filter.offset > 0 {
            qb.push(" LIMIT -1");
        }
        if filter.offset > 0 {
            qb.push(" OFFSET ").push_bind(i64::from(filter.offset));
        }

        let rows: Vec<SqliteFundingRateRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter()
            .map(SqliteFundingRateRow::into_domain)
            .collect()
    }
}
