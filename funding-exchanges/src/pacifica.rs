use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use funding_types::{CancelToken, Exchange, ExchangeError, FundingRate};

use crate::config::ExchangeConfig;
use crate::http::{build_client, get_json, parse_number};

/// The raw JSON shape of Pacifica's `/v1/info/prices`
#[derive(Debug, Deserialize)]
struct PricesResponse {
    #[serde(default)]
    success: Option<bool>,
    data: Vec<PriceInfo>,
}

#[derive(Debug, Deserialize)]
struct PriceInfo {
    symbol: String,
    funding: String,
    oracle: String,
}

pub struct Pacifica {
    config: ExchangeConfig,
    client: reqwest::Client,
}

impl Pacifica {
    pub fn new(config: ExchangeConfig) -> Result<Self, ExchangeError> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Exchange for Pacifica {
    fn name(&self) -> &'static str {
        "pacifica"
    }

    /// One call returns every market with its current funding and oracle price.
    async fn fetch_funding_rates(
        &self,
        cancel: &CancelToken,
    ) -> Result<Vec<FundingRate>, ExchangeError> {
        let url = self.config.url("/v1/info/prices");
        let response: PricesResponse = get_json(&self.client, &url, cancel).await?;

        // Pacifica signals errors via the success flag, not just HTTP status
        if response.success == Some(false) {
            return Err(ExchangeError::UnexpectedData(
                "Pacifica returned success=false".into(),
            ));
        }

        let now = Utc::now();
        let rates: Vec<FundingRate> = response
            .data
            .into_iter()
            .filter_map(|item| {
                let Some(rate) = parse_number(&item.funding) else {
                    tracing::debug!(
                        exchange = self.name(),
                        symbol = %item.symbol,
                        "skipping unparseable funding rate"
                    );
                    return None;
                };
                Some(
                    FundingRate::new(self.name(), item.symbol, rate, now)
                        .with_price(parse_number(&item.oracle)),
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
