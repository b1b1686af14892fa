//! The community map catalog: a spreadsheet export with one row per map,
//! carrying the group preset, win condition and difficulty ratings.
//!
//! Rows whose preset doesn't embed their own map ID are treated as stale and
//! quietly left out; see [`preset`] for the encoding.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use league_logging::Log;

mod errors;
pub use errors::{CatalogError, Rejection};

mod names;
pub use names::{clean_map_name, rsplit};

pub mod preset;

/// Header names as they appear in the spreadsheet, after trimming.
pub mod columns {
    pub const NAME: &str = "Map / Player";
    pub const PRESET: &str = "Group Preset";
    pub const DIFFICULTY: &str = "Final Rating";
    pub const FUN: &str = "Final Fun \nRating";
    pub const CATEGORY: &str = "Category";
    pub const MAP_ID: &str = "Map ID";
    pub const PSEUDO_MAP_ID: &str = "Pseudo \nMap ID";
    pub const CAPS_TO_WIN: &str = "Num\nof caps";
    pub const ALLOW_BLUE_CAPS: &str = "Allow Blue Caps";
    pub const BALLS_REQUIRED: &str = "Min\nBalls \nRec";
    pub const MAX_BALLS: &str = "Max\nBalls\nRec";
}

/// How many captures end a match on a given map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CapsToWin {
    Count(u32),

    /// The map isn't won by capping (the catalog marks these `pups`), so no
    /// capture count ever satisfies it.
    Unbounded,
}

impl CapsToWin {
    /// Interprets the raw catalog token. Blank means one cap; otherwise the
    /// leading integer is used, and anything without one can never be met.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();

        if token.is_empty() {
            return Self::Count(1);
        }

        if token == "pups" {
            return Self::Unbounded;
        }

        let digits: &str = &token[..token.bytes().take_while(u8::is_ascii_digit).count()];

        match digits.parse() {
            Ok(n) => Self::Count(n),
            Err(_) => Self::Unbounded,
        }
    }

    /// Whether a player's running capture count meets this threshold.
    pub fn is_met_by(&self, captures: u64) -> bool {
        match self {
            Self::Count(n) => u64::from(*n) == captures,
            Self::Unbounded => false,
        }
    }
}

impl Default for CapsToWin {
    fn default() -> Self {
        Self::Count(1)
    }
}

impl serde::Serialize for CapsToWin {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Count(n) => serializer.serialize_u32(*n),
            Self::Unbounded => serializer.serialize_str("infinite"),
        }
    }
}

/// One usable catalog entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDescriptor {
    pub name: String,
    pub preset: String,
    pub difficulty: String,
    pub fun: String,
    pub category: String,
    pub map_id: String,

    /// Pseudo map IDs: other IDs the same physical map is also known under.
    pub equivalent_map_ids: BTreeSet<String>,

    /// Raw token from the sheet; see [`MapDescriptor::caps_to_win`].
    #[serde(rename = "capsToWin")]
    pub caps_to_win_token: String,

    pub allow_blue_caps: bool,
    pub balls_required: String,
    pub max_balls_recommended: String,
}

impl MapDescriptor {
    pub fn caps_to_win(&self) -> CapsToWin {
        CapsToWin::from_token(&self.caps_to_win_token)
    }

    /// Checks that this row is self-consistent.
    pub fn validate(&self) -> Result<(), Rejection> {
        if self.preset.trim().is_empty() {
            return Err(Rejection::BlankPreset);
        }

        if self.map_id.is_empty() {
            return Err(Rejection::BlankMapId);
        }

        let map_id = preset::parse_map_id(&self.map_id).ok_or(Rejection::InvalidMapId)?;

        match preset::embeds_map_id(&self.preset, map_id) {
            true => Ok(()),
            false => Err(Rejection::PresetMismatch),
        }
    }
}

/// Validates a single descriptor, handing it back only if it can be trusted.
pub fn validate(descriptor: MapDescriptor) -> Option<MapDescriptor> {
    match descriptor.validate() {
        Ok(()) => Some(descriptor),

        Err(reason) => {
            tracing::debug!(target: Log::Catalog, map_id = %descriptor.map_id, name = %descriptor.name, ?reason, "Rejected catalog row");
            None
        },
    }
}

/// Column lookup by (trimmed) header name.
struct Headers(HashMap<String, usize>);

impl Headers {
    fn new(record: &csv::StringRecord) -> Self {
        let mut index = HashMap::new();

        // The first column with a given name wins.
        for (i, header) in record.iter().enumerate() {
            index.entry(header.trim().to_string()).or_insert(i);
        }

        Self(index)
    }

    /// The trimmed value of column `header`, or `""` if either the column or
    /// the cell is missing.
    fn get<'r>(&self, row: &'r csv::StringRecord, header: &str) -> &'r str {
        self.0.get(header).and_then(|&i| row.get(i)).map(str::trim).unwrap_or("")
    }
}

fn descriptor_from_row(headers: &Headers, row: &csv::StringRecord) -> MapDescriptor {
    let equivalent_map_ids = headers
        .get(row, columns::PSEUDO_MAP_ID)
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect();

    MapDescriptor {
        name: headers.get(row, columns::NAME).to_string(),
        preset: headers.get(row, columns::PRESET).to_string(),
        difficulty: headers.get(row, columns::DIFFICULTY).to_string(),
        fun: headers.get(row, columns::FUN).to_string(),
        category: headers.get(row, columns::CATEGORY).to_string(),
        map_id: headers.get(row, columns::MAP_ID).to_string(),
        equivalent_map_ids,
        caps_to_win_token: headers.get(row, columns::CAPS_TO_WIN).to_string(),
        allow_blue_caps: headers.get(row, columns::ALLOW_BLUE_CAPS).eq_ignore_ascii_case("TRUE"),
        balls_required: headers.get(row, columns::BALLS_REQUIRED).to_string(),
        max_balls_recommended: headers.get(row, columns::MAX_BALLS).to_string(),
    }
}

/// Parses every row of the catalog CSV with a non-blank preset, without any
/// validation.
pub fn parse_rows(csv_text: &str) -> Result<Vec<MapDescriptor>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let header_record = reader.headers()?.clone();
    if header_record.is_empty() {
        return Err(CatalogError::MissingHeader);
    }

    let headers = Headers::new(&header_record);
    let mut rows = Vec::new();

    for record in reader.records() {
        let descriptor = descriptor_from_row(&headers, &record?);

        if !descriptor.preset.is_empty() {
            rows.push(descriptor);
        }
    }

    Ok(rows)
}

/// Drops inconsistent rows. When any row for a map ID is rejected, every row
/// sharing that ID goes with it, since there's no telling which one is right.
pub fn retain_consistent(rows: Vec<MapDescriptor>) -> Vec<MapDescriptor> {
    let illegal: HashSet<String> = rows
        .iter()
        .filter(|row| validate((*row).clone()).is_none())
        .map(|row| row.map_id.clone())
        .collect();

    if !illegal.is_empty() {
        tracing::info!(target: Log::Catalog, count = illegal.len(), "Excluding map IDs with inconsistent presets");
    }

    rows.into_iter().filter(|row| !illegal.contains(&row.map_id)).collect()
}

/// Parses and validates the catalog CSV, returning only usable entries.
pub fn load_catalog(csv_text: &str) -> Result<Vec<MapDescriptor>, CatalogError> {
    let rows = parse_rows(csv_text)?;
    let total = rows.len();

    let catalog = retain_consistent(rows);
    tracing::info!(target: Log::Catalog, total, usable = catalog.len(), "Loaded map catalog");

    Ok(catalog)
}

/// Finds the entry for `map_id`, first by its own ID and then by pseudo ID.
pub fn find_map<'a>(catalog: &'a [MapDescriptor], map_id: &str) -> Option<&'a MapDescriptor> {
    catalog
        .iter()
        .find(|m| m.map_id == map_id)
        .or_else(|| catalog.iter().find(|m| m.equivalent_map_ids.contains(map_id)))
}

/// Cleaned map name to preset, for tools that start groups by name. Later
/// rows win when two maps clean to the same name.
pub fn preset_index(catalog: &[MapDescriptor]) -> BTreeMap<String, String> {
    catalog
        .iter()
        .map(|m| (clean_map_name(&m.name).to_string(), m.preset.clone()))
        .collect()
}
