//! Latest-per-pair query construction shared by the SQL backends.
//!
//! Caller input only ever reaches the database as bound parameters. The
//! ORDER BY clause is assembled from [`SortField::column`] and
//! [`SortOrder::keyword`], both of which return fixed strings.

use sqlx::{Database, Encode, QueryBuilder, Type};

use funding_types::FundingRateFilter;

/// Columns selected by every read, in `FromRow` order.
pub(crate) const COLUMNS: &str =
    "id, exchange, symbol, price, rate, timestamp, next_funding, created_at";

/// Ordering that picks the winner inside one (exchange, symbol) group.
pub(crate) const LATEST_FIRST: &str = "timestamp DESC, created_at DESC, id DESC";

/// Appends the optional exchange/symbol restrictions. Expects the builder
/// to already hold a `WHERE` clause.
pub(crate) fn push_pair_filters<'args, DB>(
    qb: &mut QueryBuilder<'args, DB>,
    filter: &FundingRateFilter,
) where
    DB: Database,
    String: 'args + Encode<'args, DB> + Type<DB>,
{
    if let Some(exchange) = &filter.exchange {
        qb.push(" AND exchange = ").push_bind(exchange.clone());
    }
    if let Some(symbol) = &filter.symbol {
        qb.push(" AND symbol = ").push_bind(symbol.clone());
    }
}

/// ORDER BY clause for the deduplicated set.
///
/// NULL prices sort last in both directions; equal sort keys fall back to
/// exchange then symbol so pagination is stable.
pub(crate) fn order_by_clause(filter: &FundingRateFilter) -> String {
    format!(
        " ORDER BY {} {} NULLS LAST, exchange ASC, symbol ASC",
        filter.sort_by.column(),
        filter.sort_order.keyword()
    )
}
