use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog has no header row")]
    MissingHeader,
}

/// Why a catalog row was left out. This is never surfaced as a failure; it
/// only exists so the loader can say why in its logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    BlankPreset,
    BlankMapId,
    InvalidMapId,
    PresetMismatch,
}
