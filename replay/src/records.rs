//! Picking records out of many scored replays.

use std::cmp::Reverse;

use league_catalog::{find_map, MapDescriptor};

use crate::types::MatchRecord;

/// The catalog map a record was played on, falling back to the raw map ID
/// when the catalog doesn't know it.
fn catalog_map_id<'a>(record: &'a MatchRecord, catalog: &'a [MapDescriptor]) -> Option<&'a str> {
    let raw = record.effective_map_id.as_deref()?;

    Some(find_map(catalog, raw).map_or(raw, |map| map.map_id.as_str()))
}

/// The fastest finished record on `map_id`. Replays played under one of the
/// map's pseudo IDs count towards it. Ties go to the earlier record.
pub fn best_record<'r>(records: &'r [MatchRecord], catalog: &[MapDescriptor], map_id: &str) -> Option<&'r MatchRecord> {
    records
        .iter()
        .filter(|record| catalog_map_id(record, catalog) == Some(map_id))
        .filter_map(|record| Some((record.record_time_ms?, record)))
        .min_by_key(|(ms, _)| *ms)
        .map(|(_, record)| record)
}

/// Finished records on catalog maps, newest first. Records without a start
/// time sort last.
pub fn leaderboard<'r>(records: &'r [MatchRecord], catalog: &[MapDescriptor]) -> Vec<&'r MatchRecord> {
    let mut entries: Vec<&MatchRecord> = records
        .iter()
        .filter(|record| record.is_finished())
        .filter(|record| {
            record
                .effective_map_id
                .as_deref()
                .is_some_and(|id| find_map(catalog, id).is_some())
        })
        .collect();

    entries.sort_by_key(|record| Reverse(record.started_at_timestamp));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_catalog::CapsToWin;

    fn record(map_id: &str, ms: Option<i64>, started: Option<i64>, uuid: &str) -> MatchRecord {
        MatchRecord {
            map_name: None,
            map_author: None,
            players: Vec::new(),
            capping_player_name: None,
            capping_player_user_id: None,
            record_time_formatted: None,
            record_time_ms: ms,
            is_solo: true,
            started_at_timestamp: started,
            uuid: Some(uuid.into()),
            capping_player_quote: None,
            caps_to_win: CapsToWin::Count(1),
            allow_blue_caps: false,
            effective_map_id: Some(map_id.into()),
        }
    }

    fn catalog() -> Vec<MapDescriptor> {
        let mut map = MapDescriptor {
            map_id: "10".into(),
            ..Default::default()
        };
        map.equivalent_map_ids.insert("55".into());
        vec![map]
    }

    #[test]
    fn best_record_is_fastest_finished_run() {
        let records = vec![
            record("10", Some(9000), Some(1), "a"),
            record("10", None, Some(2), "dnf"),
            record("55", Some(7000), Some(3), "pseudo"),
            record("10", Some(7000), Some(4), "tie"),
            record("11", Some(10), Some(5), "other"),
        ];

        let best = best_record(&records, &catalog(), "10").unwrap();
        assert_eq!(best.uuid.as_deref(), Some("pseudo"));

        assert_eq!(best_record(&records, &catalog(), "11").unwrap().uuid.as_deref(), Some("other"));
        assert!(best_record(&records, &catalog(), "12").is_none());
    }

    #[test]
    fn leaderboard_is_newest_finished_catalog_runs() {
        let records = vec![
            record("10", Some(9000), Some(1), "old"),
            record("10", None, Some(9), "dnf"),
            record("55", Some(7000), Some(5), "new"),
            record("11", Some(10), Some(7), "unlisted"),
            record("10", Some(8000), None, "undated"),
        ];

        let uuids: Vec<&str> = leaderboard(&records, &catalog())
            .into_iter()
            .filter_map(|r| r.uuid.as_deref())
            .collect();

        assert_eq!(uuids, vec!["new", "old", "undated"]);
    }
}
