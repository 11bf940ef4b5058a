// Season statistics from the stats API.
//
// One request per stat group returns every eligible player's season line as a
// "split" under `stats[0].splits`. Each split is normalized into a
// `PlayerStatRecord`, keeping the API's order.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use super::{get_text, FetchError};
use crate::config::Config;
use crate::model::{PlayerStatRecord, StatGroup, StatLine};

// ---------------------------------------------------------------------------
// Raw response serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawStatsResponse {
    stats: Option<Vec<RawStatsBlock>>,
}

#[derive(Debug, Deserialize)]
struct RawStatsBlock {
    splits: Option<Vec<RawSplit>>,
}

#[derive(Debug, Deserialize)]
struct RawSplit {
    player: Option<RawPlayer>,
    #[serde(default)]
    stat: RawStatLine,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayer {
    id: Option<u64>,
    full_name: Option<String>,
}

/// The subset of the API's stat object that is kept. Everything else the API
/// sends is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatLine {
    avg: Option<Value>,
    obp: Option<Value>,
    ops: Option<Value>,
    plate_appearances: Option<Value>,
    base_on_balls: Option<Value>,
    strike_outs: Option<Value>,
    era: Option<Value>,
    batters_faced: Option<Value>,
}

impl From<RawStatLine> for StatLine {
    fn from(raw: RawStatLine) -> Self {
        StatLine {
            avg: raw.avg,
            obp: raw.obp,
            ops: raw.ops,
            plate_appearances: raw.plate_appearances,
            base_on_balls: raw.base_on_balls,
            strike_outs: raw.strike_outs,
            era: raw.era,
            batters_faced: raw.batters_faced,
            war: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Normalize a stats API body into player records. `url` is only used to
/// label errors.
fn parse_stats_response(body: &str, url: &str) -> Result<Vec<PlayerStatRecord>, FetchError> {
    let raw: RawStatsResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::malformed(url, format!("invalid JSON: {e}")))?;

    let splits = raw
        .stats
        .ok_or_else(|| FetchError::malformed(url, "missing `stats`"))?
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::malformed(url, "`stats` is empty"))?
        .splits
        .ok_or_else(|| FetchError::malformed(url, "missing `stats[0].splits`"))?;

    splits
        .into_iter()
        .enumerate()
        .map(|(i, split)| -> Result<PlayerStatRecord, FetchError> {
            let player = split
                .player
                .ok_or_else(|| FetchError::malformed(url, format!("split {i} has no `player`")))?;
            let id = player.id.ok_or_else(|| {
                FetchError::malformed(url, format!("split {i} has no `player.id`"))
            })?;
            let name = player.full_name.ok_or_else(|| {
                FetchError::malformed(url, format!("split {i} has no `player.fullName`"))
            })?;
            Ok(PlayerStatRecord {
                id,
                name,
                stat: split.stat.into(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// StatsFetcher
// ---------------------------------------------------------------------------

/// Fetches one season of player stats per group.
#[derive(Debug, Clone)]
pub struct StatsFetcher {
    http: Client,
    base_url: String,
    season: u16,
    player_pool: String,
    limit: u32,
}

impl StatsFetcher {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.stats_api.base_url.clone(),
            season: config.season,
            player_pool: config.stats_api.player_pool.clone(),
            limit: config.stats_api.limit,
        }
    }

    /// Fetch every player's season line for `group`, in API order.
    #[instrument(skip(self), fields(season = self.season))]
    pub async fn fetch(&self, group: StatGroup) -> Result<Vec<PlayerStatRecord>, FetchError> {
        info!("Fetching {group} stats from {}", self.base_url);

        let query = [
            ("stats", "season".to_string()),
            ("group", group.as_str().to_string()),
            ("season", self.season.to_string()),
            ("playerPool", self.player_pool.clone()),
            ("limit", self.limit.to_string()),
        ];
        let body = get_text(&self.http, &self.base_url, &query).await?;
        let records = parse_stats_response(&body, &self.base_url)?;

        info!("Fetched {} {group} records", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
