use async_trait::async_trait;
use chrono::Utc;
use futures_util::future::join_all;
use reqwest::Url;
use serde::Deserialize;

use funding_types::{CancelToken, Exchange, ExchangeError, FundingRate};

use crate::config::ExchangeConfig;
use crate::http::{build_client, get_json, parse_number};

const STATUS_NORMAL: &str = "NORMAL";

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    status: String,
    #[serde(rename = "futureContracts", default)]
    future_contracts: Vec<Contract>,
}

#[derive(Debug, Deserialize)]
struct Contract {
    /// Trading pair used to query prices, e.g. `BTC/USDT-P`
    symbol: String,
    #[serde(rename = "underlyingSymbol")]
    underlying_symbol: String,
}

#[derive(Debug, Deserialize)]
struct PriceData {
    #[serde(rename = "markPrice")]
    mark_price: Option<String>,
    #[serde(rename = "fundingRateEstimation")]
    funding_rate_estimation: FundingEstimate,
}

#[derive(Debug, Deserialize)]
struct FundingEstimate {
    #[serde(rename = "estimatedFundingRate")]
    estimated_funding_rate: String,
}

/// Hibachi has no bulk funding endpoint, so contracts are discovered first
/// and each one is priced with its own request.
pub struct Hibachi {
    config: ExchangeConfig,
    client: reqwest::Client,
}

impl Hibachi {
    pub fn new(config: ExchangeConfig) -> Result<Self, ExchangeError> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    async fn contracts(&self, cancel: &CancelToken) -> Result<Vec<Contract>, ExchangeError> {
        let url = self.config.url("/market/exchange-info");
        let info: ExchangeInfo = get_json(&self.client, &url, cancel).await?;

        if info.status != STATUS_NORMAL {
            return Err(ExchangeError::UnexpectedData(format!(
                "unexpected exchange status: {}",
                info.status
            )));
        }

        Ok(info.future_contracts)
    }

    async fn price_data(
        &self,
        pair: &str,
        cancel: &CancelToken,
    ) -> Result<PriceData, ExchangeError> {
        let endpoint = self.config.url("/market/data/prices");
        let url = Url::parse_with_params(&endpoint, &[("symbol", pair)])
            .map_err(|e| ExchangeError::Config(e.to_string()))?;
        get_json(&self.client, url.as_str(), cancel).await
    }
}

#[async_trait]
impl Exchange for Hibachi {
    fn name(&self) -> &'static str {
        "hibachi"
    }

    /// Failed per-contract requests are logged and skipped. The fetch only
    /// errors when discovery fails, when no contract could be priced, or when
    /// `cancel` fires before every contract has answered.
    async fn fetch_funding_rates(
        &self,
        cancel: &CancelToken,
    ) -> Result<Vec<FundingRate>, ExchangeError> {
        let contracts = self.contracts(cancel).await?;
        if contracts.is_empty() {
            return Ok(Vec::new());
        }

        let results = join_all(
            contracts
                .iter()
                .map(|contract| self.price_data(&contract.symbol, cancel)),
        )
        .await;

        // A partial snapshot must not outlive a cancelled cycle.
        if cancel.is_cancelled() {
            return Err(ExchangeError::Cancelled);
        }

        let now = Utc::now();
        let mut rates = Vec::with_capacity(contracts.len());
        let mut last_error = None;

        for (contract, result) in contracts.into_iter().zip(results) {
            match result {
                Ok(data) => {
                    let Some(rate) =
                        parse_number(&data.funding_rate_estimation.estimated_funding_rate)
                    else {
                        tracing::debug!(
                            exchange = self.name(),
                            symbol = %contract.underlying_symbol,
                            "skipping unparseable funding rate"
                        );
                        continue;
                    };
                    let price = data.mark_price.as_deref().and_then(parse_number);
                    rates.push(
                        FundingRate::new(self.name(), contract.underlying_symbol, rate, now)
                            .with_price(price),
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        exchange = self.name(),
                        pair = %contract.symbol,
                        error = %e,
                        "failed to fetch contract prices"
                    );
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error.filter(|_| rates.is_empty()) {
            return Err(e);
        }

        tracing::info!(
            exchange = self.name(),
            count = rates.len(),
            "fetched funding rates"
        );
        Ok(rates)
    }
}
