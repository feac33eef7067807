use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use funding_types::{CancelToken, Exchange, ExchangeError, FundingRate};

use crate::config::ExchangeConfig;
use crate::http::{build_client, get_json};

/// Lighter's `/v1/funding-rates` lists rates for several venues at once;
/// only entries tagged with our own name are kept.
#[derive(Debug, Deserialize)]
struct FundingRatesResponse {
    funding_rates: Vec<FundingRateEntry>,
}

#[derive(Debug, Deserialize)]
struct FundingRateEntry {
    exchange: String,
    symbol: String,
    rate: f64,
}

pub struct Lighter {
    config: ExchangeConfig,
    client: reqwest::Client,
}

impl Lighter {
    pub fn new(config: ExchangeConfig) -> Result<Self, ExchangeError> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Exchange for Lighter {
    fn name(&self) -> &'static str {
        "lighter"
    }

    async fn fetch_funding_rates(
        &self,
        cancel: &CancelToken,
    ) -> Result<Vec<FundingRate>, ExchangeError> {
        let url = self.config.url("/v1/funding-rates");
        let response: FundingRatesResponse = get_json(&self.client, &url, cancel).await?;

        let now = Utc::now();
        let rates: Vec<FundingRate> = response
            .funding_rates
            .into_iter()
            .filter(|entry| entry.exchange == self.name())
            .map(|entry| FundingRate::new(self.name(), entry.symbol, entry.rate, now))
            .collect();

        tracing::info!(
            exchange = self.name(),
            count = rates.len(),
            "fetched funding rates"
        );
        Ok(rates)
    }
}
