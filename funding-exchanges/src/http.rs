//! Shared outbound HTTP plumbing for the adapters.

use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;

use funding_types::{CancelToken, ExchangeError};

use crate::config::ExchangeConfig;

/// Builds the adapter's own client with its timeout and optional proxy.
pub(crate) fn build_client(config: &ExchangeConfig) -> Result<Client, ExchangeError> {
    let mut builder = Client::builder().timeout(config.timeout);

    if let Some(proxy) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| ExchangeError::Config(format!("invalid proxy {proxy:?}: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ExchangeError::Config(e.to_string()))
}

/// GETs `url` and decodes a JSON body, aborting when `cancel` fires.
///
/// Only a 200 response is accepted.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    cancel: &CancelToken,
) -> Result<T, ExchangeError> {
    if cancel.is_cancelled() {
        return Err(ExchangeError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ExchangeError::Cancelled),
        result = fetch_json(client, url) => result,
    }
}

async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, ExchangeError> {
    let response = client
        .get(url)
        .header(CONTENT_TYPE, "application/json")
        .send()
        .await
        .map_err(|e| ExchangeError::Http(e.to_string()))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ExchangeError::Status(status.as_u16()));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ExchangeError::Http(e.to_string()))?;

    serde_json::from_slice(&body).map_err(|e| ExchangeError::Decode(e.to_string()))
}

/// Parses a decimal string as sent by most venues. Non-finite values are
/// rejected.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
