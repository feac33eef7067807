use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use funding_types::{CancelToken, Exchange, ExchangeError, FundingRate};

use crate::config::ExchangeConfig;
use crate::http::{build_client, get_json, parse_number};

#[derive(Debug, Deserialize)]
struct MarkPrice {
    symbol: String,
    #[serde(rename = "fundingRate")]
    funding_rate: String,
    #[serde(rename = "markPrice")]
    mark_price: Option<String>,
}

pub struct Backpack {
    config: ExchangeConfig,
    client: reqwest::Client,
}

impl Backpack {
    pub fn new(config: ExchangeConfig) -> Result<Self, ExchangeError> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

/// `BTC_USDC_PERP` -> `BTC`
fn base_asset(symbol: &str) -> &str {
    symbol.split('_').next().unwrap_or(symbol)
}

#[async_trait]
impl Exchange for Backpack {
    fn name(&self) -> &'static str {
        "backpack"
    }

    async fn fetch_funding_rates(
        &self,
        cancel: &CancelToken,
    ) -> Result<Vec<FundingRate>, ExchangeError> {
        let url = self.config.url("/v1/markPrices");
        let response: Vec<MarkPrice> = get_json(&self.client, &url, cancel).await?;

        let now = Utc::now();
        let rates: Vec<FundingRate> = response
            .into_iter()
            .filter_map(|item| {
                let Some(rate) = parse_number(&item.funding_rate) else {
                    tracing::debug!(
                        exchange = self.name(),
                        symbol = %item.symbol,
                        "skipping unparseable funding rate"
                    );
                    return None;
                };
                let price = item.mark_price.as_deref().and_then(parse_number);
                Some(
                    FundingRate::new(self.name(), base_asset(&item.symbol), rate, now)
                        .with_price(price),
                )
            })
            .collect();

        tracing::info!(
            exchange = self.name(),
            count = rates.len(),
            "fetched funding rates"
        );
        Ok(rates)
    }
}
