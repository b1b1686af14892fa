use thiserror::Error;

use league_catalog::CatalogError;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay io error: {0}")]
    Io(String),

    #[error("replay parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The fixed leading records aren't where they have to be. Nothing past
    /// this point can be trusted, so decoding stops here.
    #[error("invalid replay format: {0}")]
    Format(String),

    #[error("replay source error: {0}")]
    Source(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
