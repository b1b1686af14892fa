pub mod combine;
pub mod decoder;
pub mod errors;
pub mod hold;
mod lenient;
pub mod parser;
pub mod records;
pub mod source;
pub mod time;
pub mod types;

pub use crate::{
    combine::{combine, remap_ids},
    decoder::{decode, summarize},
    errors::ReplayError,
    hold::{hold_times, HoldSummary, PlayerHold},
    parser::{parse_raw_events, parse_replay, write_ndjson},
    source::{CatalogSource, CsvFileCatalog, FileReplaySource, ReplaySource, StaticCatalog},
    records::{best_record, leaderboard},
    time::{format_hold_time, format_record_time},
    types::{EventPayload, MatchRecord, PlayerRef, RawEvent, ReplayEvent, ReplaySummary},
};

pub use league_catalog::{CapsToWin, MapDescriptor};

use league_logging::Log;

/// Wires a replay source and a catalog source to the decoder.
///
/// The sources can be swapped via the builder below, for tests or for
/// fetching over the network instead of from disk.
#[derive(Debug)]
pub struct Scorer {
    replays: Box<dyn ReplaySource + Send + Sync>,
    catalog: Box<dyn CatalogSource + Send + Sync>,
}

impl Scorer {
    /// Reads replays from disk and scores them without a catalog.
    pub fn new_with_defaults() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ScorerBuilder {
        ScorerBuilder::default()
    }

    /// Fetches and decodes the events of one replay.
    pub fn load_events(&self, reference: &str) -> Result<Vec<ReplayEvent>, ReplayError> {
        let text = self.replays.fetch_replay(reference)?;
        tracing::debug!(target: Log::Replay, reference, bytes = text.len(), "Fetched replay");

        parse_replay(&text)
    }

    /// Fetches the replay and catalog, then scores the replay.
    ///
    /// The replay is fetched first so a bad reference fails before the
    /// (usually slower) catalog download.
    pub fn score(&self, reference: &str) -> Result<MatchRecord, ReplayError> {
        let events = self.load_events(reference)?;
        let catalog = self.catalog.fetch_catalog()?;

        decode(&events, &catalog)
    }

    pub fn summarize(&self, reference: &str) -> Result<ReplaySummary, ReplayError> {
        summarize(&self.load_events(reference)?)
    }

    pub fn hold_times(&self, reference: &str) -> Result<HoldSummary, ReplayError> {
        hold_times(&self.load_events(reference)?)
    }

    /// Scores every replay against one catalog download and returns the
    /// fastest finished run on `map_id`, if any.
    pub fn best_record(&self, map_id: &str, references: &[String]) -> Result<Option<MatchRecord>, ReplayError> {
        let catalog = self.catalog.fetch_catalog()?;

        let records = references
            .iter()
            .map(|reference| decode(&self.load_events(reference)?, &catalog))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(target: Log::Replay, map_id, scored = records.len(), "Looking up best record");

        Ok(best_record(&records, &catalog, map_id).cloned())
    }

    /// Fetches both replays without decoding payloads and merges them.
    pub fn combine(&self, first: &str, second: &str, id_offset: i64) -> Result<Vec<RawEvent>, ReplayError> {
        let first = parse_raw_events(&self.replays.fetch_replay(first)?)?;
        let second = parse_raw_events(&self.replays.fetch_replay(second)?)?;

        Ok(combine(first, second, id_offset))
    }

    pub fn catalog(&self) -> Result<Vec<MapDescriptor>, ReplayError> {
        self.catalog.fetch_catalog()
    }
}

#[derive(Default)]
pub struct ScorerBuilder {
    replays: Option<Box<dyn ReplaySource + Send + Sync>>,
    catalog: Option<Box<dyn CatalogSource + Send + Sync>>,
}

impl ScorerBuilder {
    pub fn with_replays(mut self, src: impl ReplaySource + Send + Sync + 'static) -> Self {
        self.replays = Some(Box::new(src));
        self
    }

    pub fn with_catalog(mut self, src: impl CatalogSource + Send + Sync + 'static) -> Self {
        self.catalog = Some(Box::new(src));
        self
    }

    pub fn build(self) -> Scorer {
        Scorer {
            replays: self.replays.unwrap_or_else(|| Box::new(FileReplaySource)),
            catalog: self.catalog.unwrap_or_else(|| Box::new(StaticCatalog::default())),
        }
    }
}
