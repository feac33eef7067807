use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use funding_types::{CancelToken, Exchange, ExchangeError, FundingRate};

use crate::config::ExchangeConfig;
use crate::http::{build_client, get_json, parse_number};

#[derive(Debug, Deserialize)]
struct MarketsResponse {
    data: Vec<Market>,
}

#[derive(Debug, Deserialize)]
struct Market {
    #[serde(rename = "assetName")]
    asset_name: String,

    #[serde(default)]
    active: bool,

    #[serde(rename = "marketStats")]
    market_stats: Option<MarketStats>,
}

#[derive(Debug, Deserialize)]
struct MarketStats {
    #[serde(rename = "fundingRate")]
    funding_rate: String,
}

pub struct Extended {
    config: ExchangeConfig,
    client: reqwest::Client,
}

impl Extended {
    pub fn new(config: ExchangeConfig) -> Result<Self, ExchangeError> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Exchange for Extended {
    fn name(&self) -> &'static str {
        "extended"
    }

    /// Inactive markets are skipped.
    async fn fetch_funding_rates(
        &self,
        cancel: &CancelToken,
    ) -> Result<Vec<FundingRate>, ExchangeError> {
        let url = self.config.url("/v1/info/markets");
        let response: MarketsResponse = get_json(&self.client, &url, cancel).await?;

        let now = Utc::now();
        let rates: Vec<FundingRate> = response
            .data
            .into_iter()
            .filter(|market| market.active)
            .filter_map(|market| {
                let rate = market
                    .market_stats
                    .as_ref()
                    .and_then(|stats| parse_number(&stats.funding_rate));
                match rate {
                    Some(rate) => Some(FundingRate::new(self.name(), market.asset_name, rate, now)),
                    None => {
                        tracing::debug!(
                            exchange = self.name(),
                            symbol = %market.asset_name,
                            "skipping market without funding rate"
                        );
                        None
                    }
                }
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
