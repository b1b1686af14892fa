//! How long each player and team carried the flag.

use std::collections::{BTreeMap, HashMap};

use league_logging::Log;

use crate::decoder::players_by_id;
use crate::errors::ReplayError;
use crate::time::format_hold_time;
use crate::types::{EventPayload, PlayerRef, ReplayEvent};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerHold {
    pub id: i64,
    pub name: Option<String>,
    pub is_red: bool,
    pub hold_ms: i64,
    pub hold_time: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldSummary {
    pub red_total_ms: i64,
    pub red_total_time: String,
    pub blue_total_ms: i64,
    pub blue_total_time: String,
    pub players: Vec<PlayerHold>,
}

/// Open holds keyed by player id, with the timestamp of the grab.
#[derive(Default)]
struct Holds {
    open: HashMap<i64, i64>,
    held: BTreeMap<i64, i64>,
}

impl Holds {
    fn grab(&mut self, id: i64, timestamp: i64) {
        self.open.entry(id).or_insert(timestamp);
    }

    fn release(&mut self, ids: impl Iterator<Item = i64>, timestamp: i64) {
        for id in ids {
            if let Some(start) = self.open.remove(&id) {
                let total = self.held.entry(id).or_default();
                *total = total.saturating_add(timestamp.saturating_sub(start));
            }
        }
    }
}

/// Sums flag hold time per player and per team.
///
/// A hold starts at a `tagproGrab` and ends at the holder's next `kill`,
/// `drop` or `p` entry. A second grab while already holding is ignored, and
/// holds still open when the replay ends don't count. Only players on the
/// roster are tracked; anyone not on red counts towards blue.
pub fn hold_times(events: &[ReplayEvent]) -> Result<HoldSummary, ReplayError> {
    let metadata = events
        .iter()
        .find_map(|event| match &event.payload {
            EventPayload::RecorderMetadata(metadata) => Some(metadata),
            _ => None,
        })
        .ok_or_else(|| ReplayError::Format("replay has no `recorder-metadata` record".into()))?;

    let roster = players_by_id(metadata);
    let mut holds = Holds::default();

    for event in events {
        match &event.payload {
            EventPayload::FlagGrab(grab) => {
                if let Some(id) = grab.id.filter(|id| roster.contains_key(id)) {
                    holds.grab(id, event.timestamp);
                }
            },

            EventPayload::Kill(actors) | EventPayload::Drop(actors) => {
                holds.release(actors.iter().filter_map(|a| a.id), event.timestamp);
            },

            EventPayload::PlayerUpdates(updates) => {
                holds.release(updates.iter().filter_map(|u| u.id), event.timestamp);
            },

            _ => {},
        }
    }

    if !holds.open.is_empty() {
        tracing::debug!(target: Log::Replay, open = holds.open.len(), "Ignoring holds still open at end of replay");
    }

    let players: Vec<PlayerHold> = roster
        .values()
        .map(|PlayerRef { id, name, is_red, .. }| {
            let hold_ms = holds.held.get(id).copied().unwrap_or(0);

            PlayerHold {
                id: *id,
                name: name.clone(),
                is_red: *is_red,
                hold_ms,
                hold_time: format_hold_time(hold_ms),
            }
        })
        .collect();

    let team_total = |red: bool| {
        players
            .iter()
            .filter(|p| p.is_red == red)
            .fold(0i64, |total, p| total.saturating_add(p.hold_ms))
    };

    let red_total_ms = team_total(true);
    let blue_total_ms = team_total(false);

    Ok(HoldSummary {
        red_total_ms,
        red_total_time: format_hold_time(red_total_ms),
        blue_total_ms,
        blue_total_time: format_hold_time(blue_total_ms),
        players,
    })
}
