// Core data types shared by the fetchers, the merge step and the persisted
// database document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ---------------------------------------------------------------------------
// Stat groups
// ---------------------------------------------------------------------------

/// The stats API's statistical group. Also names the top-level key of the
/// persisted database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatGroup {
    Hitting,
    Pitching,
}

impl StatGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            StatGroup::Hitting => "hitting",
            StatGroup::Pitching => "pitching",
        }
    }
}

impl fmt::Display for StatGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Player records
// ---------------------------------------------------------------------------

/// One player's season line. Upstream values are kept exactly as the stats
/// API sent them (the API mixes strings like `".300"` with integers), and a
/// field the API omitted serializes as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatLine {
    pub avg: Option<Value>,
    pub obp: Option<Value>,
    pub ops: Option<Value>,
    pub plate_appearances: Option<Value>,
    pub base_on_balls: Option<Value>,
    pub strike_outs: Option<Value>,
    pub era: Option<Value>,
    pub batters_faced: Option<Value>,
    /// WAR as it appears in the source dataset; attached by the merge step.
    pub war: Option<String>,
}

impl StatLine {
    /// Numeric view of `war`. `None` when absent or not a number.
    pub fn war_value(&self) -> Option<f64> {
        self.war
            .as_deref()
            .and_then(|w| w.trim().parse::<f64>().ok())
            .filter(|w| w.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatRecord {
    pub id: u64,
    pub name: String,
    pub stat: StatLine,
}

// ---------------------------------------------------------------------------
// WAR lookup
// ---------------------------------------------------------------------------

/// Player id -> WAR for a single season.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarLookup {
    season: String,
    entries: HashMap<String, String>,
}

impl WarLookup {
    pub fn new(season: impl Into<String>) -> Self {
        Self {
            season: season.into(),
            entries: HashMap::new(),
        }
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    /// Insert or replace the WAR for `id`. Returns the previous value.
    pub fn insert(&mut self, id: impl Into<String>, war: impl Into<String>) -> Option<String> {
        self.entries.insert(id.into(), war.into())
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    /// Look up a stats API player id. Ids are compared in their string form.
    pub fn war_for(&self, player_id: u64) -> Option<&str> {
        self.get(&player_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Persisted database
// ---------------------------------------------------------------------------

/// Season-keyed records per stat group. Seasons are string keys so the
/// document reads `{"hitting": {"2023": [...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsDatabase {
    pub hitting: BTreeMap<String, Vec<PlayerStatRecord>>,
    pub pitching: BTreeMap<String, Vec<PlayerStatRecord>>,
}

impl StatsDatabase {
    /// A database holding exactly one season for both groups.
    pub fn for_season(
        season: u16,
        hitters: Vec<PlayerStatRecord>,
        pitchers: Vec<PlayerStatRecord>,
    ) -> Self {
        let key = season.to_string();
        let mut db = Self::default();
        db.hitting.insert(key.clone(), hitters);
        db.pitching.insert(key, pitchers);
        db
    }

    pub fn group(&self, group: StatGroup) -> &BTreeMap<String, Vec<PlayerStatRecord>> {
        match group {
            StatGroup::Hitting => &self.hitting,
            StatGroup::Pitching => &self.pitching,
        }
    }

    /// Records for one group and season; empty when the season is absent.
    pub fn season(&self, group: StatGroup, season: &str) -> &[PlayerStatRecord] {
        self.group(group)
            .get(season)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
