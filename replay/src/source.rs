//! Where replays and the map catalog come from. The scorer only needs text
//! and descriptors; fetching them is someone else's job.

use std::fs;
use std::path::PathBuf;

use league_catalog::{load_catalog, MapDescriptor};

use crate::errors::ReplayError;

/// Produces raw replay text for a caller-supplied reference (a path, a UUID,
/// a link; whatever the implementation understands).
pub trait ReplaySource: std::fmt::Debug {
    fn fetch_replay(&self, reference: &str) -> Result<String, ReplayError>;
}

/// Produces the usable map catalog.
pub trait CatalogSource: std::fmt::Debug {
    fn fetch_catalog(&self) -> Result<Vec<MapDescriptor>, ReplayError>;
}

/// Treats the reference as a path on disk.
#[derive(Debug, Clone, Default)]
pub struct FileReplaySource;

impl ReplaySource for FileReplaySource {
    fn fetch_replay(&self, reference: &str) -> Result<String, ReplayError> {
        fs::read_to_string(reference).map_err(|e| ReplayError::Io(format!("{reference}: {e}")))
    }
}

/// Reads a catalog CSV export off disk every time it's asked.
#[derive(Debug, Clone)]
pub struct CsvFileCatalog {
    path: PathBuf,
}

impl CsvFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for CsvFileCatalog {
    fn fetch_catalog(&self) -> Result<Vec<MapDescriptor>, ReplayError> {
        let text = fs::read_to_string(&self.path).map_err(|e| ReplayError::Io(format!("{}: {e}", self.path.display())))?;

        Ok(load_catalog(&text)?)
    }
}

/// A fixed, already-loaded catalog. Empty by default, in which case every map
/// is scored as first-cap-wins.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog(pub Vec<MapDescriptor>);

impl CatalogSource for StaticCatalog {
    fn fetch_catalog(&self) -> Result<Vec<MapDescriptor>, ReplayError> {
        Ok(self.0.clone())
    }
}
