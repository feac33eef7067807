//! Exchange adapters that fetch perpetual funding rates.
//!
//! Each venue is one implementation of [`funding_types::Exchange`]. Adapters
//! own their HTTP client (timeout and optional proxy come from
//! [`ExchangeConfig`]) and return rates normalized to
//! [`funding_types::FundingRate`], stamped with a single fetch time.
//!
//! # Example
//! ```no_run
//! use funding_exchanges::{build_exchanges, ExchangeConfig, ExchangeKind};
//!
//! let configs: Vec<_> = ExchangeKind::ALL
//!     .iter()
//!     .map(|kind| (*kind, ExchangeConfig::for_kind(*kind)))
//!     .collect();
//! let exchanges = build_exchanges(&configs).expect("valid adapter config");
//! assert_eq!(exchanges.len(), 4); // backpack is off by default
//! ```

use std::sync::Arc;

use funding_types::{Exchange, ExchangeError};

mod backpack;
mod config;
mod extended;
mod hibachi;
mod http;
mod lighter;
mod pacifica;

pub use backpack::Backpack;
pub use config::{ExchangeConfig, ExchangeKind};
pub use extended::Extended;
pub use hibachi::Hibachi;
pub use lighter::Lighter;
pub use pacifica::Pacifica;

/// Builds the adapter for a single venue regardless of its active flag.
pub fn build_exchange(
    kind: ExchangeKind,
    config: ExchangeConfig,
) -> Result<Arc<dyn Exchange>, ExchangeError> {
    let exchange: Arc<dyn Exchange> = match kind {
        ExchangeKind::Pacifica => Arc::new(Pacifica::new(config)?),
        ExchangeKind::Lighter => Arc::new(Lighter::new(config)?),
        ExchangeKind::Extended => Arc::new(Extended::new(config)?),
        ExchangeKind::Hibachi => Arc::new(Hibachi::new(config)?),
        ExchangeKind::Backpack => Arc::new(Backpack::new(config)?),
    };
    Ok(exchange)
}

/// Builds every active adapter, in the order given. Inactive ones are
/// skipped with an info log.
pub fn build_exchanges(
    configs: &[(ExchangeKind, ExchangeConfig)],
) -> Result<Vec<Arc<dyn Exchange>>, ExchangeError> {
    let mut exchanges = Vec::with_capacity(configs.len());

    for (kind, config) in configs {
        if !config.is_active {
            tracing::info!(exchange = kind.name(), "exchange disabled, skipping");
            continue;
        }
        exchanges.push(build_exchange(*kind, config.clone())?);
    }

    Ok(exchanges)
}
