//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use funding_types::{
    FundingRate, FundingRateFilter, FundingRateRecord, FundingRepository, RepoError,
};

use crate::query::{COLUMNS, LATEST_FIRST, order_by_clause, push_pair_filters};
use crate::types::PgFundingRateRow;

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository backed by a connection pool.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_funding_rates_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }
}

/// Latest record per (exchange, symbol), filtered then sorted and paged.
fn latest_query(filter: &FundingRateFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new(format!(
        "SELECT {COLUMNS} FROM (SELECT DISTINCT ON (exchange, symbol) {COLUMNS} \
         FROM funding_rates WHERE TRUE"
    ));
    push_pair_filters(&mut qb, filter);
    qb.push(format!(
        " ORDER BY exchange, symbol, {LATEST_FIRST}) AS latest"
    ));
    qb.push(order_by_clause(filter));

    if filter.limit > 0 {
        qb.push(" LIMIT ").push_bind(i64::from(filter.limit));
    }
    if filter.offset > 0 {
        qb.push(" OFFSET ").push_bind(i64::from(filter.offset));
    }
    qb
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl FundingRepository for PostgresRepo {
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

        let now = Utc::now();

        for (index, rate) in rates.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO funding_rates (id, exchange, symbol, price, rate, timestamp, next_funding, created_at)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
            )
            .bind(Uuid::new_v4())
            .bind(&rate.exchange)
            .bind(&rate.symbol)
            .bind(rate.price)
            .bind(rate.rate)
            .bind(rate.timestamp)
            .bind(rate.next_funding)
            .bind(now)
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
        let mut qb = latest_query(&filter);
        let rows: Vec<PgFundingRateRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(PgFundingRateRow::into_domain).collect()
    }
}
