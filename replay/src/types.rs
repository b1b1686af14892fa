use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use league_catalog::CapsToWin;
use league_logging::Log;

use crate::lenient;

/// One line of a replay file, exactly as recorded: `[timestamp, type, payload]`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawEvent(pub i64, pub String, pub Value);

impl RawEvent {
    pub fn timestamp(&self) -> i64 {
        self.0
    }

    pub fn kind(&self) -> &str {
        &self.1
    }
}

/// The `recorder-metadata` record that opens every replay.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RecorderMetadata {
    #[serde(default, deserialize_with = "lenient::entries")]
    pub players: Vec<MetadataPlayer>,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub started: Option<i64>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub uuid: Option<String>,
}

/// A roster entry. Entries without a usable `id` are dropped from the roster.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MetadataPlayer {
    #[serde(deserialize_with = "lenient::required_integer")]
    pub id: i64,

    #[serde(alias = "displayName", default, deserialize_with = "lenient::text")]
    pub display_name: Option<String>,

    #[serde(alias = "userId", default, deserialize_with = "lenient::text")]
    pub user_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub team: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MapData {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub info: MapInfo,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MapInfo {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub author: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ClientInfo {
    #[serde(default, deserialize_with = "lenient::text")]
    pub mapfile: Option<String>,
}

/// Game clock state changes. `state == 1` means the match is running.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TimeUpdate {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub state: Option<i64>,
}

/// A partial state update for one player inside a `p` snapshot. Only the
/// fields that scoring needs are kept.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PlayerUpdate {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub id: Option<i64>,

    #[serde(rename = "s-captures", default)]
    pub raw_captures: Option<Value>,
}

impl PlayerUpdate {
    /// The capture counter, if this update carries one and it's a whole
    /// non-negative number.
    pub fn captures(&self) -> Option<u64> {
        let value = self.raw_captures.as_ref()?;

        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ChatMessage {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub from: Option<i64>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub message: Option<String>,
}

/// The player a flag event happened to (`tagproGrab`, `kill`, `drop`).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FlagActor {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub id: Option<i64>,
}

/// Event payloads keyed on the event type.
#[derive(Clone, Debug, PartialEq)]
pub enum EventPayload {
    RecorderMetadata(RecorderMetadata),
    Map(MapData),
    ClientInfo(ClientInfo),
    Time(TimeUpdate),
    PlayerUpdates(Vec<PlayerUpdate>),
    Chat(ChatMessage),
    FlagGrab(FlagActor),
    Kill(Vec<FlagActor>),
    Drop(Vec<FlagActor>),

    /// Anything we don't score on, or a non-header type whose payload didn't
    /// have the expected shape.
    Other { kind: String, payload: Value },
}

/// Header records always decode; fields that don't fit come back empty.
fn header_or_default<T>(kind: &str, payload: &Value) -> T
where
    T: DeserializeOwned + Default,
{
    T::deserialize(payload).unwrap_or_else(|error| {
        tracing::debug!(target: Log::Replay, kind, ?error, "Header payload unreadable, using empty record");
        T::default()
    })
}

/// `Some` for arrays and lone objects; entries that don't fit are skipped.
fn entry_list<T>(payload: &Value) -> Option<Vec<T>>
where
    T: DeserializeOwned,
{
    (payload.is_array() || payload.is_object()).then(|| lenient::entries_of(payload))
}

impl EventPayload {
    pub const RECORDER_METADATA: &'static str = "recorder-metadata";
    pub const MAP: &'static str = "map";
    pub const CLIENT_INFO: &'static str = "clientInfo";
    pub const TIME: &'static str = "time";
    pub const PLAYER_UPDATES: &'static str = "p";
    pub const CHAT: &'static str = "chat";
    pub const FLAG_GRAB: &'static str = "tagproGrab";
    pub const KILL: &'static str = "kill";
    pub const DROP: &'static str = "drop";

    /// Decodes `payload` according to `kind`.
    pub fn decode(kind: &str, payload: Value) -> Self {
        let decoded = match kind {
            Self::RECORDER_METADATA => Some(Self::RecorderMetadata(header_or_default(kind, &payload))),
            Self::MAP => Some(Self::Map(header_or_default(kind, &payload))),
            Self::CLIENT_INFO => Some(Self::ClientInfo(header_or_default(kind, &payload))),
            Self::TIME => TimeUpdate::deserialize(&payload).ok().map(Self::Time),
            Self::PLAYER_UPDATES => entry_list(&payload).map(Self::PlayerUpdates),
            Self::CHAT => ChatMessage::deserialize(&payload).ok().map(Self::Chat),
            Self::FLAG_GRAB => FlagActor::deserialize(&payload).ok().map(Self::FlagGrab),
            Self::KILL => entry_list(&payload).map(Self::Kill),
            Self::DROP => entry_list(&payload).map(Self::Drop),

            _ => {
                return Self::Other {
                    kind: kind.to_string(),
                    payload,
                };
            },
        };

        decoded.unwrap_or_else(|| {
            tracing::debug!(target: Log::Replay, kind, "Payload did not match its event schema");

            Self::Other {
                kind: kind.to_string(),
                payload,
            }
        })
    }

    /// The event type this payload was recorded under.
    pub fn kind(&self) -> &str {
        match self {
            Self::RecorderMetadata(_) => Self::RECORDER_METADATA,
            Self::Map(_) => Self::MAP,
            Self::ClientInfo(_) => Self::CLIENT_INFO,
            Self::Time(_) => Self::TIME,
            Self::PlayerUpdates(_) => Self::PLAYER_UPDATES,
            Self::Chat(_) => Self::CHAT,
            Self::FlagGrab(_) => Self::FLAG_GRAB,
            Self::Kill(_) => Self::KILL,
            Self::Drop(_) => Self::DROP,
            Self::Other { kind, .. } => kind,
        }
    }
}

/// A decoded replay event.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayEvent {
    pub timestamp: i64,
    pub payload: EventPayload,
}

impl From<RawEvent> for ReplayEvent {
    fn from(RawEvent(timestamp, kind, payload): RawEvent) -> Self {
        Self {
            timestamp,
            payload: EventPayload::decode(&kind, payload),
        }
    }
}

/// A participant, keyed by their replay-local id while decoding.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRef {
    pub id: i64,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub is_red: bool,
}

impl From<&MetadataPlayer> for PlayerRef {
    fn from(player: &MetadataPlayer) -> Self {
        Self {
            id: player.id,
            name: player.display_name.clone(),
            user_id: player.user_id.clone(),
            is_red: player.team == Some(1),
        }
    }
}

/// Everything a leaderboard needs to know about one replay.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub map_name: Option<String>,
    pub map_author: Option<String>,
    pub players: Vec<PlayerRef>,
    pub capping_player_name: Option<String>,
    pub capping_player_user_id: Option<String>,
    pub record_time_formatted: Option<String>,
    pub record_time_ms: Option<i64>,
    pub is_solo: bool,
    pub started_at_timestamp: Option<i64>,
    pub uuid: Option<String>,
    pub capping_player_quote: Option<String>,
    pub caps_to_win: CapsToWin,
    pub allow_blue_caps: bool,
    pub effective_map_id: Option<String>,
}

impl MatchRecord {
    /// Whether somebody reached the cap threshold.
    pub fn is_finished(&self) -> bool {
        self.record_time_ms.is_some()
    }
}

/// A quick look at a replay without scoring it.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    pub map_name: Option<String>,
    pub num_players: usize,
    pub started_at_timestamp: Option<i64>,
    pub started_at: Option<DateTime<Utc>>,
    pub uuid: Option<String>,
}
