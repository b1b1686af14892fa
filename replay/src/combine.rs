//! Merges two replays of the same map into one stream, e.g. to watch two
//! solo runs race each other.

use serde_json::Value;

use crate::types::RawEvent;

/// Adds `offset` to `object[key]` when it holds an integer. An id that
/// would overflow is left as it was.
fn shift(object: &mut Value, key: &str, offset: i64) {
    if let Some(shifted) = object.get(key).and_then(Value::as_i64).and_then(|id| id.checked_add(offset)) {
        object[key] = Value::from(shifted);
    }
}

/// Every entry of an array payload, or the payload itself if it's an object.
fn entries_mut(payload: &mut Value) -> Vec<&mut Value> {
    match payload {
        Value::Array(items) => items.iter_mut().collect(),
        other => vec![other],
    }
}

/// Shifts every player id in `events` by `offset` so they can't collide
/// with another replay's players.
pub fn remap_ids(events: &mut [RawEvent], offset: i64) {
    for RawEvent(_, kind, payload) in events.iter_mut() {
        match kind.as_str() {
            "recorder-metadata" => {
                if let Some(players) = payload.get_mut("players").and_then(Value::as_array_mut) {
                    for player in players {
                        shift(player, "id", offset);
                    }
                }
            },

            "p" | "tagproGrab" | "kill" | "drop" => {
                for entry in entries_mut(payload) {
                    shift(entry, "id", offset);
                }
            },

            "e" => {
                for entry in entries_mut(payload) {
                    shift(entry, "id", offset);
                    shift(entry, "from", offset);
                    shift(entry, "to", offset);
                }
            },

            "m" => shift(payload, "id", offset),

            "chat" => shift(payload, "from", offset),

            "replayPlayerMessage" => {
                shift(payload, "for", offset);
                shift(payload, "id", offset);
            },

            _ => {},
        }
    }
}

/// Remaps `second` by `id_offset` and interleaves it with `first` by
/// timestamp. Events sharing a timestamp keep `first`'s before `second`'s.
pub fn combine(first: Vec<RawEvent>, mut second: Vec<RawEvent>, id_offset: i64) -> Vec<RawEvent> {
    remap_ids(&mut second, id_offset);

    let mut combined = first;
    combined.extend(second);
    combined.sort_by_key(RawEvent::timestamp);

    combined
}
