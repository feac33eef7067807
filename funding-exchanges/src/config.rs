//! Per-adapter configuration.

use std::time::Duration;

/// The venues this crate can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeKind {
    Pacifica,
    Lighter,
    Extended,
    Hibachi,
    Backpack,
}

impl ExchangeKind {
    pub const ALL: [ExchangeKind; 5] = [
        ExchangeKind::Pacifica,
        ExchangeKind::Lighter,
        ExchangeKind::Extended,
        ExchangeKind::Hibachi,
        ExchangeKind::Backpack,
    ];

    /// Lowercase venue identifier, also the persisted exchange name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pacifica => "pacifica",
            Self::Lighter => "lighter",
            Self::Extended => "extended",
            Self::Hibachi => "hibachi",
            Self::Backpack => "backpack",
        }
    }

    /// Public API root for the venue.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Pacifica => "https://api.pacifica.fi/api",
            Self::Lighter => "https://mainnet.zklighter.elliot.ai/api",
            Self::Extended => "https://api.starknet.extended.exchange/api",
            Self::Hibachi => "https://data-api.hibachi.xyz",
            Self::Backpack => "https://api.backpack.exchange/api",
        }
    }

    pub fn default_timeout(self) -> Duration {
        match self {
            Self::Backpack => Duration::from_secs(5),
            _ => Duration::from_secs(30),
        }
    }

    /// Backpack is wired but off unless explicitly enabled.
    pub fn enabled_by_default(self) -> bool {
        !matches!(self, Self::Backpack)
    }
}

impl std::fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Construction settings for one adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    pub base_url: String,
    /// Outbound proxy URL applied to every request
    pub proxy: Option<String>,
    pub is_active: bool,
    pub timeout: Duration,
}

impl ExchangeConfig {
    /// Active config with the given base URL and a 30s timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            proxy: None,
            is_active: true,
            timeout: Duration::from_secs(30),
        }
    }

    /// The venue's defaults.
    pub fn for_kind(kind: ExchangeKind) -> Self {
        Self {
            is_active: kind.enabled_by_default(),
            timeout: kind.default_timeout(),
            ..Self::new(kind.default_base_url())
        }
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Joins the base URL with an endpoint path.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
