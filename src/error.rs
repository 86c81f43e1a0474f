//! Error types for the news search client

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Missing or unusable client configuration, raised at construction
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Query parameters rejected before any request was sent
    #[error("invalid search parameter: {0}")]
    Validation(String),

    /// HTTP 401
    #[error("Naver OpenAPI authentication failed, check the client id and secret")]
    Authentication,

    /// HTTP 429
    #[error("Naver OpenAPI call quota exceeded, try again later")]
    RateLimited,

    /// Transport failure or any other non-2xx status, passed through untouched
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}
