//! Scores a decoded replay: who capped, and how long it took.

use std::collections::BTreeMap;

use league_catalog::{find_map, CapsToWin, MapDescriptor};
use league_logging::Log;

use crate::errors::ReplayError;
use crate::time::format_record_time;
use crate::types::{ClientInfo, EventPayload, MapData, MatchRecord, PlayerRef, RecorderMetadata, ReplayEvent, ReplaySummary};

/// The records every replay opens with, borrowed out of the event list.
struct Header<'a> {
    metadata: &'a RecorderMetadata,
    map: &'a MapData,
    client_info: &'a ClientInfo,
}

fn unexpected(index: usize, expected: &str, found: &EventPayload) -> ReplayError {
    ReplayError::Format(format!("record {index} must be `{expected}` (found `{}`)", found.kind()))
}

/// Checks the fixed record positions: metadata at 0, map at 2, client info
/// at 3. Record 1 is never looked at. Only the record types matter here;
/// header payloads always decode, with unreadable fields left empty.
fn read_header(events: &[ReplayEvent]) -> Result<Header<'_>, ReplayError> {
    if events.len() < 4 {
        return Err(ReplayError::Format(format!("replay has only {} records", events.len())));
    }

    let metadata = match &events[0].payload {
        EventPayload::RecorderMetadata(metadata) => metadata,
        other => return Err(unexpected(0, EventPayload::RECORDER_METADATA, other)),
    };

    let map = match &events[2].payload {
        EventPayload::Map(map) => map,
        other => return Err(unexpected(2, EventPayload::MAP, other)),
    };

    let client_info = match &events[3].payload {
        EventPayload::ClientInfo(client_info) => client_info,
        other => return Err(unexpected(3, EventPayload::CLIENT_INFO, other)),
    };

    Ok(Header {
        metadata,
        map,
        client_info,
    })
}

/// Replay-local id to player. Ordered by id so output is stable.
pub(crate) fn players_by_id(metadata: &RecorderMetadata) -> BTreeMap<i64, PlayerRef> {
    metadata.players.iter().map(|p| (p.id, PlayerRef::from(p))).collect()
}

/// The map ID is the second segment of the client's map file path, e.g.
/// `"maps/12345"`.
fn effective_map_id(client_info: &ClientInfo) -> Option<String> {
    let mapfile = client_info.mapfile.as_deref().filter(|m| !m.is_empty())?;

    mapfile.split('/').nth(1).map(String::from)
}

/// Timestamp the game clock started running at, or 0 if it never did.
fn clock_origin(events: &[ReplayEvent]) -> i64 {
    events
        .iter()
        .find_map(|event| match &event.payload {
            EventPayload::Time(time) if time.state == Some(1) => Some(event.timestamp),
            _ => None,
        })
        .unwrap_or(0)
}

/// First snapshot entry, in stream then array order, where a known player's
/// capture count meets the threshold.
fn winning_cap<'p>(
    events: &[ReplayEvent],
    players: &'p BTreeMap<i64, PlayerRef>,
    caps_to_win: CapsToWin,
) -> Option<(i64, &'p PlayerRef)> {
    events.iter().find_map(|event| {
        let EventPayload::PlayerUpdates(updates) = &event.payload else {
            return None;
        };

        updates.iter().find_map(|update| {
            if !caps_to_win.is_met_by(update.captures()?) {
                return None;
            }

            let player = players.get(&update.id?)?;
            Some((event.timestamp, player))
        })
    })
}

/// The last thing `player_id` said in chat, in stream order.
fn last_quote(events: &[ReplayEvent], player_id: i64) -> Option<String> {
    events
        .iter()
        .rev()
        .find_map(|event| match &event.payload {
            EventPayload::Chat(chat) if chat.from == Some(player_id) => Some(chat),
            _ => None,
        })
        .and_then(|chat| chat.message.clone())
}

/// Decodes a replay into its match record.
///
/// Only a malformed header is an error. A match nobody finished, a capper
/// who never chatted, or a map missing from the catalog all come back as
/// `None` fields.
pub fn decode(events: &[ReplayEvent], catalog: &[MapDescriptor]) -> Result<MatchRecord, ReplayError> {
    let header = read_header(events)?;

    let players = players_by_id(header.metadata);
    let map_id = effective_map_id(header.client_info);

    let matched = map_id.as_deref().and_then(|id| find_map(catalog, id));
    let caps_to_win = matched.map(MapDescriptor::caps_to_win).unwrap_or_default();

    tracing::debug!(
        target: Log::Replay,
        map_id = ?map_id,
        matched = matched.is_some(),
        ?caps_to_win,
        "Resolved win condition"
    );

    let origin = clock_origin(events);

    let mut record = MatchRecord {
        map_name: header.map.info.name.clone(),
        map_author: header.map.info.author.clone(),
        players: players.values().cloned().collect(),
        capping_player_name: None,
        capping_player_user_id: None,
        record_time_formatted: None,
        record_time_ms: None,
        is_solo: players.len() == 1,
        started_at_timestamp: header.metadata.started,
        uuid: header.metadata.uuid.clone(),
        capping_player_quote: None,
        caps_to_win,
        allow_blue_caps: matched.is_some_and(|m| m.allow_blue_caps),
        effective_map_id: map_id,
    };

    match winning_cap(events, &players, caps_to_win) {
        Some((timestamp, capper)) => {
            let elapsed = timestamp.saturating_sub(origin);

            record.record_time_ms = Some(elapsed);
            record.record_time_formatted = Some(format_record_time(elapsed));
            record.capping_player_name = capper.name.clone();
            record.capping_player_user_id = capper.user_id.clone();
            record.capping_player_quote = last_quote(events, capper.id);

            tracing::info!(target: Log::Replay, uuid = ?record.uuid, capper = ?capper.name, elapsed, "Found winning cap");
        },

        None => {
            tracing::info!(target: Log::Replay, uuid = ?record.uuid, "No winning cap in replay");
        },
    }

    Ok(record)
}

/// Map name, head count and start time, without any scoring.
pub fn summarize(events: &[ReplayEvent]) -> Result<ReplaySummary, ReplayError> {
    let header = read_header(events)?;
    let started = header.metadata.started;

    Ok(ReplaySummary {
        map_name: header.map.info.name.clone(),
        num_players: players_by_id(header.metadata).len(),
        started_at_timestamp: started,
        started_at: started.and_then(chrono::DateTime::from_timestamp_millis),
        uuid: header.metadata.uuid.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChatMessage, MapInfo, MetadataPlayer, PlayerUpdate, RawEvent, TimeUpdate};
    use serde_json::json;

    fn event(timestamp: i64, payload: EventPayload) -> ReplayEvent {
        ReplayEvent { timestamp, payload }
    }

    fn header(players: &[(i64, &str, i64)], mapfile: &str) -> Vec<ReplayEvent> {
        let players = players
            .iter()
            .map(|(id, name, team)| MetadataPlayer {
                id: *id,
                display_name: Some(name.to_string()),
                user_id: Some(format!("u{id}")),
                team: Some(*team),
            })
            .collect();

        vec![
            event(
                0,
                EventPayload::RecorderMetadata(RecorderMetadata {
                    players,
                    started: Some(1000),
                    uuid: Some("abc".into()),
                }),
            ),
            event(1, EventPayload::Other { kind: "x".into(), payload: json!({}) }),
            event(
                2,
                EventPayload::Map(MapData {
                    info: MapInfo {
                        name: Some("M1".into()),
                        author: Some("Auth".into()),
                    },
                }),
            ),
            event(
                3,
                EventPayload::ClientInfo(ClientInfo {
                    mapfile: Some(mapfile.into()),
                }),
            ),
        ]
    }

    fn caps(timestamp: i64, entries: &[(i64, u64)]) -> ReplayEvent {
        let updates = entries
            .iter()
            .map(|(id, n)| PlayerUpdate {
                id: Some(*id),
                raw_captures: Some(json!(n)),
            })
            .collect();

        event(timestamp, EventPayload::PlayerUpdates(updates))
    }

    fn chat(timestamp: i64, from: i64, message: &str) -> ReplayEvent {
        event(
            timestamp,
            EventPayload::Chat(ChatMessage {
                from: Some(from),
                message: Some(message.into()),
            }),
        )
    }

    fn running(timestamp: i64) -> ReplayEvent {
        event(timestamp, EventPayload::Time(TimeUpdate { state: Some(1) }))
    }

    fn catalog_entry(map_id: &str, caps: &str) -> MapDescriptor {
        MapDescriptor {
            map_id: map_id.into(),
            caps_to_win_token: caps.into(),
            ..Default::default()
        }
    }

    #[test]
    fn origin_defaults_to_zero() {
        let mut events = header(&[(1, "A", 1)], "x/5");
        events.push(caps(2500, &[(1, 1)]));

        let record = decode(&events, &[]).unwrap();
        assert_eq!(record.record_time_ms, Some(2500));
        assert_eq!(record.record_time_formatted.as_deref(), Some("2.500"));
        assert!(record.is_solo);
    }

    #[test]
    fn only_first_running_state_sets_origin() {
        let mut events = header(&[(1, "A", 1)], "x/5");
        events.push(event(5, EventPayload::Time(TimeUpdate { state: Some(3) })));
        events.push(running(100));
        events.push(running(900));
        events.push(caps(1100, &[(1, 1)]));

        assert_eq!(decode(&events, &[]).unwrap().record_time_ms, Some(1000));
    }

    #[test]
    fn threshold_comes_from_catalog() {
        let mut events = header(&[(1, "A", 1), (2, "B", 2)], "maps/77");
        events.push(running(0));
        events.push(caps(100, &[(1, 1)]));
        events.push(caps(200, &[(2, 1), (1, 2)]));
        events.push(caps(300, &[(2, 2)]));

        let record = decode(&events, &[catalog_entry("77", "2")]).unwrap();
        assert_eq!(record.caps_to_win, CapsToWin::Count(2));
        assert_eq!(record.capping_player_name.as_deref(), Some("A"));
        assert_eq!(record.record_time_ms, Some(200));
    }

    #[test]
    fn array_order_breaks_ties_within_a_snapshot() {
        let mut events = header(&[(1, "A", 1), (2, "B", 2)], "x/5");
        events.push(caps(50, &[(2, 1), (1, 1)]));

        let record = decode(&events, &[]).unwrap();
        assert_eq!(record.capping_player_name.as_deref(), Some("B"));
        assert_eq!(record.capping_player_user_id.as_deref(), Some("u2"));
    }

    #[test]
    fn unknown_player_ids_are_skipped() {
        let mut events = header(&[(1, "A", 1)], "x/5");
        events.push(caps(50, &[(9, 1)]));
        events.push(caps(80, &[(1, 1)]));

        let record = decode(&events, &[]).unwrap();
        assert_eq!(record.capping_player_name.as_deref(), Some("A"));
        assert_eq!(record.record_time_ms, Some(80));
    }

    #[test]
    fn pseudo_id_match_is_used_when_primary_missing() {
        let mut entry = catalog_entry("10", "3");
        entry.allow_blue_caps = true;
        entry.equivalent_map_ids.insert("55".into());

        let events = header(&[(1, "A", 1)], "x/55");
        let record = decode(&events, &[entry]).unwrap();

        assert_eq!(record.caps_to_win, CapsToWin::Count(3));
        assert!(record.allow_blue_caps);
        assert_eq!(record.effective_map_id.as_deref(), Some("55"));
    }

    #[test]
    fn pups_maps_never_produce_a_record() {
        let mut events = header(&[(1, "A", 1)], "x/5");
        events.push(running(0));
        events.push(caps(10, &[(1, 1)]));
        events.push(caps(20, &[(1, 2)]));
        events.push(caps(30, &[(1, 99)]));

        let record = decode(&events, &[catalog_entry("5", "pups")]).unwrap();
        assert_eq!(record.caps_to_win, CapsToWin::Unbounded);
        assert_eq!(record.record_time_formatted, None);
        assert_eq!(record.capping_player_name, None);
    }

    #[test]
    fn quote_is_last_chat_in_stream_order() {
        let mut events = header(&[(1, "A", 1), (2, "B", 2)], "x/5");
        events.push(chat(10, 1, "glhf"));
        events.push(caps(20, &[(1, 1)]));
        events.push(chat(30, 2, "nice"));
        events.push(chat(25, 1, "ez"));

        let record = decode(&events, &[]).unwrap();
        assert_eq!(record.capping_player_quote.as_deref(), Some("ez"));
    }

    #[test]
    fn capper_without_chat_has_no_quote() {
        let mut events = header(&[(1, "A", 1), (2, "B", 2)], "x/5");
        events.push(chat(10, 2, "hi"));
        events.push(caps(20, &[(1, 1)]));

        assert_eq!(decode(&events, &[]).unwrap().capping_player_quote, None);
    }

    #[test]
    fn missing_mapfile_means_no_map_id() {
        let mut events = header(&[(1, "A", 1)], "");
        events.push(caps(20, &[(1, 1)]));

        let record = decode(&events, &[catalog_entry("5", "4")]).unwrap();
        assert_eq!(record.effective_map_id, None);
        assert_eq!(record.caps_to_win, CapsToWin::Count(1));
    }

    #[test]
    fn players_come_back_ordered_by_id() {
        let events = header(&[(3, "C", 2), (1, "A", 1), (2, "B", 1)], "x/5");
        let record = decode(&events, &[]).unwrap();

        let names: Vec<Option<&str>> = record.players.iter().map(|p| p.name.as_deref()).collect();
        assert_eq!(names, vec![Some("A"), Some("B"), Some("C")]);
        assert!(record.players[0].is_red);
        assert!(!record.players[2].is_red);
    }

    #[test]
    fn short_replay_is_a_format_error() {
        let events = header(&[(1, "A", 1)], "x/5");
        assert!(matches!(decode(&events[..3], &[]), Err(ReplayError::Format(_))));
    }

    #[test]
    fn swapped_header_records_are_rejected() {
        let mut events = header(&[(1, "A", 1)], "x/5");
        events.swap(2, 3);

        let error = decode(&events, &[]).unwrap_err();
        assert!(error.to_string().contains("record 2 must be `map`"));
    }

    fn raw(timestamp: i64, kind: &str, payload: serde_json::Value) -> ReplayEvent {
        ReplayEvent::from(RawEvent(timestamp, kind.into(), payload))
    }

    #[test]
    fn empty_map_payload_is_still_a_map_record() {
        let mut events = header(&[(1, "A", 1)], "x/5");
        events[2] = raw(2, "map", json!({}));
        events.push(caps(40, &[(1, 1)]));

        let record = decode(&events, &[]).unwrap();
        assert_eq!(record.map_name, None);
        assert_eq!(record.map_author, None);
        assert_eq!(record.record_time_ms, Some(40));
    }

    #[test]
    fn non_object_header_payloads_decode_empty() {
        let mut events = header(&[(1, "A", 1)], "x/5");
        events[2] = raw(2, "map", json!("not an object"));
        events[3] = raw(3, "clientInfo", json!(null));

        let record = decode(&events, &[]).unwrap();
        assert_eq!(record.map_name, None);
        assert_eq!(record.effective_map_id, None);
    }

    #[test]
    fn null_display_name_still_scores() {
        let mut events = header(&[(1, "A", 1)], "x/5");
        events[0] = raw(0, "recorder-metadata", json!({"players": [{"id": 1, "displayName": null, "team": 1}]}));
        events.push(caps(70, &[(1, 1)]));

        let record = decode(&events, &[]).unwrap();
        assert_eq!(record.record_time_ms, Some(70));
        assert_eq!(record.capping_player_name, None);
        assert_eq!(record.players[0].name, None);
    }

    #[test]
    fn missing_players_means_nobody_can_cap() {
        let mut events = header(&[(1, "A", 1)], "x/5");
        events[0] = raw(0, "recorder-metadata", json!({"uuid": "abc"}));
        events.push(caps(70, &[(1, 1)]));

        let record = decode(&events, &[]).unwrap();
        assert!(record.players.is_empty());
        assert!(!record.is_solo);
        assert_eq!(record.record_time_ms, None);
    }

    #[test]
    fn numeric_uuid_and_loose_start_time() {
        let mut events = header(&[(1, "A", 1)], "x/5");
        events[0] = raw(
            0,
            "recorder-metadata",
            json!({"uuid": 123, "started": 1500.75, "players": [{"id": 1, "displayName": "A"}]}),
        );

        let record = decode(&events, &[]).unwrap();
        assert_eq!(record.uuid.as_deref(), Some("123"));
        assert_eq!(record.started_at_timestamp, Some(1500));

        events[0] = raw(0, "recorder-metadata", json!({"started": "1600", "players": []}));
        assert_eq!(summarize(&events).unwrap().started_at_timestamp, Some(1600));
    }

    #[test]
    fn spectator_entry_does_not_hide_the_cap() {
        let mut events = header(&[(1, "A", 1)], "x/5");
        events.push(running(10));
        events.push(raw(5000, "p", json!([{"id": "spectator"}, {"id": 1, "s-captures": 1}])));
        events.push(chat(6000, 1, "gg"));

        let record = decode(&events, &[]).unwrap();
        assert_eq!(record.record_time_formatted.as_deref(), Some("4.990"));
        assert_eq!(record.capping_player_name.as_deref(), Some("A"));
        assert_eq!(record.capping_player_quote.as_deref(), Some("gg"));
    }

    #[test]
    fn elapsed_time_saturates_instead_of_overflowing() {
        let mut events = header(&[(1, "A", 1)], "x/5");
        events.push(running(i64::MIN));
        events.push(caps(i64::MAX, &[(1, 1)]));

        let record = decode(&events, &[]).unwrap();
        assert_eq!(record.record_time_ms, Some(i64::MAX));
    }

    #[test]
    fn summary_reads_header_only() {
        let events = header(&[(1, "A", 1), (2, "B", 2)], "x/5");
        let summary = summarize(&events).unwrap();

        assert_eq!(summary.map_name.as_deref(), Some("M1"));
        assert_eq!(summary.num_players, 2);
        assert_eq!(summary.started_at_timestamp, Some(1000));
        assert_eq!(summary.started_at.map(|t| t.timestamp_millis()), Some(1000));
        assert_eq!(summary.uuid.as_deref(), Some("abc"));
    }
}
