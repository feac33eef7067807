//! Error types for the funding rate tracker.

/// Domain-level errors (invariant violations on observations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Exchange name cannot be empty")]
    EmptyExchange,

    #[error("Symbol cannot be empty (exchange {exchange})")]
    EmptySymbol { exchange: String },
}

/// Errors from a single exchange adapter call.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unexpected status code: {0}")]
    Status(u16),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unexpected data from exchange: {0}")]
    UnexpectedData(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid adapter configuration: {0}")]
    Config(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),
}

/// Application-level errors (for HTTP responses).
///
/// Query parameters are interpreted leniently, so every read failure is a
/// server-side one.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => AppError::Internal(e.to_string()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Transaction(e) => AppError::Internal(e),
        }
    }
}
