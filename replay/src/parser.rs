//! Replay files are newline-delimited JSON, one `[timestamp, type, payload]`
//! tuple per line. Replays the league bot has already downloaded are stored
//! as a single JSON array of those tuples instead, so both are accepted.

use std::io::Write;

use crate::errors::ReplayError;
use crate::types::{RawEvent, ReplayEvent};

/// Whether `text` is one JSON array of tuples rather than one tuple per line.
fn is_array_document(text: &str) -> bool {
    let mut chars = text.trim_start().chars();

    chars.next() == Some('[') && chars.find(|c| !c.is_whitespace()) == Some('[')
}

/// Splits `text` into raw events without interpreting any payloads.
///
/// Any line that isn't a well-formed tuple fails the whole replay; there's no
/// partial recovery.
pub fn parse_raw_events(text: &str) -> Result<Vec<RawEvent>, ReplayError> {
    if is_array_document(text) {
        return serde_json::from_str(text).map_err(|error| ReplayError::Parse {
            line: error.line(),
            reason: error.to_string(),
        });
    }

    let mut events = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = serde_json::from_str(line).map_err(|error| ReplayError::Parse {
            line: index + 1,
            reason: error.to_string(),
        })?;

        events.push(event);
    }

    Ok(events)
}

/// Parses `text` and decodes every payload.
pub fn parse_replay(text: &str) -> Result<Vec<ReplayEvent>, ReplayError> {
    Ok(parse_raw_events(text)?.into_iter().map(ReplayEvent::from).collect())
}

/// Writes `events` back out in the line-per-event form.
pub fn write_ndjson<W: Write>(events: &[RawEvent], mut writer: W) -> Result<(), ReplayError> {
    for event in events {
        serde_json::to_writer(&mut writer, event).map_err(|e| ReplayError::Io(e.to_string()))?;
        writer.write_all(b"\n").map_err(|e| ReplayError::Io(e.to_string()))?;
    }

    writer.flush().map_err(|e| ReplayError::Io(e.to_string()))
}
