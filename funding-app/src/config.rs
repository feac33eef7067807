//! Configuration loading from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use funding_exchanges::{ExchangeConfig, ExchangeKind};

/// Log line rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub update_interval: Duration,
    pub proxy_url: Option<String>,
    /// Every known venue with its resolved settings, active or not
    pub exchanges: Vec<(ExchangeKind, ExchangeConfig)>,
    pub log_format: LogFormat,
    pub otel_enabled: bool,
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns the raw value of a
    /// variable if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(v) => v.trim().parse().context("PORT must be a valid port number")?,
            None => 8080,
        };

        let database_url =
            var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let interval_secs: u64 = match var("UPDATE_INTERVAL_SECS") {
            Some(v) => v
                .trim()
                .parse()
                .context("UPDATE_INTERVAL_SECS must be a whole number of seconds")?,
            None => 60,
        };
        if interval_secs == 0 {
            bail!("UPDATE_INTERVAL_SECS must be greater than zero");
        }

        let proxy_url = var("PROXY_URL");

        let mut exchanges = Vec::with_capacity(ExchangeKind::ALL.len());
        for kind in ExchangeKind::ALL {
            let prefix = kind.name().to_uppercase();
            let mut config = ExchangeConfig::for_kind(kind);

            if let Some(url) = var(&format!("{prefix}_BASE_URL")) {
                config = ExchangeConfig {
                    is_active: config.is_active,
                    timeout: config.timeout,
                    ..ExchangeConfig::new(url.trim())
                };
            }
            if let Some(v) = var(&format!("{prefix}_ENABLED")) {
                config = config.active(parse_bool(&format!("{prefix}_ENABLED"), &v)?);
            }
            if let Some(v) = var(&format!("{prefix}_TIMEOUT_SECS")) {
                let secs: u64 = v
                    .trim()
                    .parse()
                    .with_context(|| format!("{prefix}_TIMEOUT_SECS must be a number"))?;
                config = config.with_timeout(Duration::from_secs(secs));
            }

            exchanges.push((kind, config.with_proxy(proxy_url.clone())));
        }

        let log_format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("LOG_FORMAT must be `pretty` or `json`, got {other:?}"),
        };

        let otel_enabled = match var("OTEL_ENABLED") {
            Some(v) => parse_bool("OTEL_ENABLED", &v)?,
            None => false,
        };

        let static_dir = var("STATIC_DIR").map(PathBuf::from);

        Ok(Self {
            port,
            database_url,
            update_interval: Duration::from_secs(interval_secs),
            proxy_url,
            exchanges,
            log_format,
            otel_enabled,
            static_dir,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{key} must be a boolean, got {value:?}"),
    }
}
