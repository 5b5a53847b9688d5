use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Sentinel stored in integer collection columns when the upstream value is missing.
pub const MISSING: i32 = -1;

/// A board game, expansion or accessory ("thing") as returned by `/thing?stats=1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: u32,
    pub name: Option<String>,
    pub subtype: String,
    pub description: Option<String>,
    pub yearpublished: Option<i32>,
    pub minplayers: Option<u32>,
    pub maxplayers: Option<u32>,
    pub playingtime: Option<u32>,
    pub minplaytime: Option<u32>,
    pub maxplaytime: Option<u32>,
    pub averating: Option<f64>,
    pub bayesaverage: Option<f64>,
    pub bggrank: Option<u32>,
    pub averageweight: Option<f64>,
    pub numratings: Option<u32>,
    pub categories: Vec<String>,
    pub mechanics: Vec<String>,
    pub family: Vec<String>,
    pub designer: Vec<String>,
    pub artist: Vec<String>,
    pub publisher: Vec<String>,
    pub expansions: Vec<u32>,
}

/// The master game table, keyed and ordered by game id.
pub type GameTable = BTreeMap<u32, GameRecord>;

#[derive(Tabled)]
pub struct GameTableRow {
    pub id: u32,
    pub name: String,
    pub year: String,
    pub players: String,
    pub rank: String,
    pub rating: String,
}

impl From<&GameRecord> for GameTableRow {
    fn from(game: &GameRecord) -> Self {
        let players = match (game.minplayers, game.maxplayers) {
            (Some(min), Some(max)) if min == max => min.to_string(),
            (Some(min), Some(max)) => format!("{}-{}", min, max),
            _ => String::new(),
        };

        GameTableRow {
            id: game.id,
            name: game.name.clone().unwrap_or_default(),
            year: display_opt(game.yearpublished),
            players,
            rank: display_opt(game.bggrank),
            rating: game.averating.map(|r| format!("{:.2}", r)).unwrap_or_default(),
        }
    }
}

/// The two subtypes a collection is split into upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subtype {
    #[serde(rename = "boardgame")]
    BoardGame,
    #[serde(rename = "boardgameexpansion")]
    Expansion,
}

impl Subtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subtype::BoardGame => "boardgame",
            Subtype::Expansion => "boardgameexpansion",
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Subtype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "boardgame" | "base" => Ok(Subtype::BoardGame),
            "boardgameexpansion" | "expansion" => Ok(Subtype::Expansion),
            other => Err(format!("Unknown subtype: {}", other)),
        }
    }
}

/// One game in a user's collection.
///
/// Integer columns use [`MISSING`] instead of `None` so filters can treat
/// them as always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub id: u32,
    pub name: String,
    pub subtype: String,
    pub yearpublished: i32,
    pub own: i32,
    pub prevowned: i32,
    pub fortrade: i32,
    pub want: i32,
    pub wanttoplay: i32,
    pub wanttobuy: i32,
    pub wishlist: i32,
    pub preordered: i32,
    pub lastmodified: Option<NaiveDateTime>,
    pub rating: Option<f64>,
    pub numplays: i32,
    pub wishlistpriority: i32,
    pub comment: Option<String>,
    pub username: String,
}

#[derive(Tabled)]
pub struct CollectionTableRow {
    pub id: u32,
    pub name: String,
    pub year: String,
    pub plays: String,
    pub rating: String,
    pub status: String,
}

impl From<&CollectionEntry> for CollectionTableRow {
    fn from(entry: &CollectionEntry) -> Self {
        let flags = [
            ("own", entry.own),
            ("prevowned", entry.prevowned),
            ("fortrade", entry.fortrade),
            ("want", entry.want),
            ("wanttoplay", entry.wanttoplay),
            ("wanttobuy", entry.wanttobuy),
            ("wishlist", entry.wishlist),
            ("preordered", entry.preordered),
        ];

        CollectionTableRow {
            id: entry.id,
            name: entry.name.clone(),
            year: display_sentinel(entry.yearpublished),
            plays: display_sentinel(entry.numplays),
            rating: entry.rating.map(|r| format!("{:.1}", r)).unwrap_or_default(),
            status: flags
                .iter()
                .filter(|(_, value)| *value == 1)
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// A geekbuddy of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct Buddy {
    pub name: String,
    pub id: String,
}

/// One row of the category or mechanism browse pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct Classification {
    pub id: String,
    pub label: String,
}

/// How a batch of game ids is requested upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameFetchMode {
    /// One `thing?id=a,b,c&stats=1` request per batch.
    #[default]
    Batch,
    /// One probe request for the whole batch, then one request per existing id.
    Probe,
}

impl FromStr for GameFetchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "batch" => Ok(GameFetchMode::Batch),
            "probe" => Ok(GameFetchMode::Probe),
            other => Err(format!("Unknown fetch mode: {}", other)),
        }
    }
}

fn display_opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn display_sentinel(value: i32) -> String {
    if value == MISSING {
        String::new()
    } else {
        value.to_string()
    }
}
