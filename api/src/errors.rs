use thiserror::Error;

use league_catalog::CatalogError;
use league_replay::ReplayError;

/// Various errors that can happen while talking to the game or catalog
/// servers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] ureq::Error),

    #[error("failed to read response body: {0}")]
    IO(#[from] std::io::Error),

    #[error("invalid response JSON: {0}")]
    InvalidResponseJSON(#[from] serde_json::Error),

    #[error("not a replay link: {0}")]
    InvalidLink(String),

    #[error("unexpected replay format: {0}")]
    UnexpectedFormat(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<ApiError> for ReplayError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Catalog(error) => ReplayError::Catalog(error),
            other => ReplayError::Source(other.to_string()),
        }
    }
}
