//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use funding_types::dto::{ErrorResponse, FundingRatesQuery, FundingRatesResponse, SymbolRates};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Latest funding rate per exchange and symbol
///
/// Rates are expressed as percentages and grouped by symbol. Unknown
/// `sort_by` values fall back to `timestamp`; anything but `asc` sorts
/// descending.
#[utoipa::path(
    get,
    path = "/api/v1/funding-rates",
    tag = "funding-rates",
    params(FundingRatesQuery),
    responses(
        (status = 200, description = "Latest rates grouped by symbol", body = FundingRatesResponse,
            example = json!({
                "data": {
                    "BTC": {
                        "exchanges": {"pacifica": 0.01, "lighter": 0.02},
                        "updated_at": {"pacifica": "2025-01-01T00:00:00Z", "lighter": "2025-01-01T00:00:00Z"}
                    }
                },
                "count": 1
            })),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn get_funding_rates() {}

/// OpenAPI documentation for the Funding Rates API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Funding Rate Tracker API",
        version = "1.0.0",
        description = "Latest perpetual futures funding rates collected from several exchanges.",
        license(name = "MIT"),
    ),
    paths(health, get_funding_rates),
    components(schemas(FundingRatesResponse, SymbolRates, ErrorResponse)),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "funding-rates", description = "Latest funding rate queries"),
    )
)]
pub struct ApiDoc;
