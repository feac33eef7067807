//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use funding_types::{
    AppError, ErrorResponse, FundingRatesQuery, FundingRatesResponse, FundingRepository,
};

use crate::TrackerService;

/// Application state shared across handlers.
pub struct AppState<R: FundingRepository> {
    pub service: Arc<TrackerService<R>>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let AppError::Internal(msg) = self.0;
        // Details stay in the logs.
        tracing::error!(error = %msg, "request failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "internal server error".to_string(),
            }),
        )
            .into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Latest funding rate per (exchange, symbol), grouped by symbol.
#[tracing::instrument(skip(state))]
pub async fn get_funding_rates<R: FundingRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<FundingRatesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state.service.get_latest_rates(query.into_filter()).await?;
    Ok(Json(FundingRatesResponse::from_records(records)))
}
