//! Latest-rate query filter.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Column a latest-rate query may be sorted by.
///
/// This is the whitelist for the dynamic ORDER BY clause: repositories only
/// ever splice [`SortField::column`] into SQL, never caller text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Rate,
    #[default]
    Timestamp,
    Symbol,
    Exchange,
    Price,
}

impl SortField {
    /// Parses a caller-supplied field name. Unknown names fall back to
    /// [`SortField::Timestamp`].
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "rate" => Self::Rate,
            "timestamp" => Self::Timestamp,
            "symbol" => Self::Symbol,
            "exchange" => Self::Exchange,
            "price" => Self::Price,
            _ => Self::default(),
        }
    }

    /// The column name this field sorts on.
    pub fn column(self) -> &'static str {
        match self {
            Self::Rate => "rate",
            Self::Timestamp => "timestamp",
            Self::Symbol => "symbol",
            Self::Exchange => "exchange",
            Self::Price => "price",
        }
    }
}

/// Sort direction. Anything other than "asc" means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Case-insensitive parse; only "asc" yields ascending.
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Filter for latest-per-pair queries. All set fields combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FundingRateFilter {
    pub exchange: Option<String>,
    pub symbol: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    /// 0 means unlimited
    pub limit: u32,
    /// 0 means no offset
    pub offset: u32,
}

impl FundingRateFilter {
    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn sorted_by(mut self, sort_by: SortField, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }
}
