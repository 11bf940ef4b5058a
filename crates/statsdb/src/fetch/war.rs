// WAR lookups built from the daily WAR text datasets.
//
// The datasets are comma-separated with a header row and one row per player
// stint per season, going back to the 1870s. Only the target season survives
// the reduction; WAR values are kept as the text the dataset carries.

use std::fmt;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use super::{get_text, FetchError};
use crate::config::{Config, WarSources};
use crate::model::WarLookup;

pub const ID_COLUMN: &str = "mlb_ID";
pub const SEASON_COLUMN: &str = "year_ID";
pub const WAR_COLUMN: &str = "WAR";

/// Which of the two WAR datasets to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarDataset {
    Batting,
    Pitching,
}

impl WarDataset {
    pub fn url(self, sources: &WarSources) -> &str {
        match self {
            WarDataset::Batting => &sources.batting_url,
            WarDataset::Pitching => &sources.pitching_url,
        }
    }
}

impl fmt::Display for WarDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarDataset::Batting => f.write_str("batting"),
            WarDataset::Pitching => f.write_str("pitching"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Reduce a WAR dataset to `mlb_ID -> WAR` for `season`.
///
/// Rows whose column count differs from the header are skipped with a
/// warning, as are rows with an empty id. A later row for the same id
/// replaces an earlier one.
pub fn parse_war_lookup(text: &str, season: u16, url: &str) -> Result<WarLookup, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FetchError::malformed(url, format!("unreadable header row: {e}")))?
        .clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| FetchError::malformed(url, format!("header has no `{name}` column")))
    };
    let id_idx = column(ID_COLUMN)?;
    let season_idx = column(SEASON_COLUMN)?;
    let war_idx = column(WAR_COLUMN)?;

    let season = season.to_string();
    let mut lookup = WarLookup::new(season.clone());
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping unreadable WAR row: {}", e);
                skipped += 1;
                continue;
            }
        };

        if record.len() != headers.len() {
            let line = record.position().map_or(0, |p| p.line());
            warn!(
                "skipping WAR row on line {}: expected {} columns, found {}",
                line,
                headers.len(),
                record.len()
            );
            skipped += 1;
            continue;
        }

        if record.get(season_idx) != Some(season.as_str()) {
            continue;
        }

        let (Some(id), Some(war)) = (record.get(id_idx), record.get(war_idx)) else {
            continue;
        };
        if id.is_empty() {
            skipped += 1;
            continue;
        }

        if let Some(previous) = lookup.insert(id, war) {
            debug!("duplicate WAR row for {} in {}, replacing {}", id, season, previous);
        }
    }

    debug!(entries = lookup.len(), skipped, "WAR lookup built");
    Ok(lookup)
}

// ---------------------------------------------------------------------------
// WarFetcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WarFetcher {
    http: Client,
    sources: WarSources,
    season: u16,
}

impl WarFetcher {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            sources: config.war.clone(),
            season: config.season,
        }
    }

    /// Download `dataset` and reduce it to the configured season.
    #[instrument(skip(self), fields(season = self.season))]
    pub async fn fetch(&self, dataset: WarDataset) -> Result<WarLookup, FetchError> {
        let url = dataset.url(&self.sources);
        info!("Fetching {dataset} WAR from {url}");

        let text = get_text(&self.http, url, &[]).await?;
        let lookup = parse_war_lookup(&text, self.season, url)?;

        info!("Loaded {} {dataset} WAR entries for {}", lookup.len(), self.season);
        Ok(lookup)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://war.test/war_daily_bat.txt";

    #[test]
    fn filters_to_target_season() {
        let text = "\
name_common,mlb_ID,year_ID,WAR
Aaron Judge,592450,2022,10.6
Aaron Judge,592450,2023,5.5
Mookie Betts,605141,2023,8.3";

        let lookup = parse_war_lookup(text, 2023, URL).unwrap();
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.season(), "2023");
        assert_eq!(lookup.get("592450"), Some("5.5"));
        assert_eq!(lookup.get("605141"), Some("8.3"));
    }

    #[test]
    fn minimal_dataset() {
        let lookup = parse_war_lookup("mlb_ID,year_ID,WAR\n1,2023,3.5", 2023, URL).unwrap();
        assert_eq!(lookup.war_for(1), Some("3.5"));
    }

    #[test]
    fn other_seasons_only_yields_empty_lookup() {
        let lookup = parse_war_lookup("mlb_ID,year_ID,WAR\n1,2022,3.5\n", 2023, URL).unwrap();
        assert!(lookup.is_empty());
    }

    #[test]
    fn column_order_is_taken_from_header() {
        let text = "WAR,team_ID,year_ID,mlb_ID\n2.1,NYY,2023,42";
        let lookup = parse_war_lookup(text, 2023, URL).unwrap();
        assert_eq!(lookup.get("42"), Some("2.1"));
    }

    #[test]
    fn last_row_for_a_player_wins() {
        // Traded players appear once per team stint.
        let text = "\
mlb_ID,year_ID,team_ID,WAR
7,2023,NYY,1.0
7,2023,SDP,2.5";

        let lookup = parse_war_lookup(text, 2023, URL).unwrap();
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.get("7"), Some("2.5"));
    }

    #[test]
    fn war_text_is_kept_verbatim() {
        let lookup = parse_war_lookup("mlb_ID,year_ID,WAR\n1,2023,-0.20\n", 2023, URL).unwrap();
        assert_eq!(lookup.get("1"), Some("-0.20"));
    }

    #[test]
    fn rows_with_wrong_column_count_are_skipped() {
        let text = "\
mlb_ID,year_ID,WAR
1,2023,3.5
2,2023
3,2023,1.2,extra
4,2023,0.4";

        let lookup = parse_war_lookup(text, 2023, URL).unwrap();
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get("1"), Some("3.5"));
        assert_eq!(lookup.get("2"), None);
        assert_eq!(lookup.get("3"), None);
        assert_eq!(lookup.get("4"), Some("0.4"));
    }

    #[test]
    fn rows_with_empty_id_are_skipped() {
        let lookup = parse_war_lookup("mlb_ID,year_ID,WAR\n,2023,1.0\n", 2023, URL).unwrap();
        assert!(lookup.is_empty());
    }

    #[test]
    fn blank_lines_and_crlf_are_tolerated() {
        let text = "mlb_ID,year_ID,WAR\r\n1,2023,3.5\r\n\r\n2,2023,1.5\r\n";
        let lookup = parse_war_lookup(text, 2023, URL).unwrap();
        assert_eq!(lookup.get("1"), Some("3.5"));
        assert_eq!(lookup.get("2"), Some("1.5"));
    }

    #[test]
    fn missing_header_column_is_malformed() {
        let err = parse_war_lookup("mlb_ID,year_ID,WAA\n1,2023,3.5", 2023, URL).unwrap_err();
        match err {
            FetchError::MalformedResponse { message, .. } => {
                assert!(message.contains("WAR"), "message: {message}")
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn empty_payload_is_malformed() {
        let err = parse_war_lookup("", 2023, URL).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse { .. }), "got {err:?}");
    }

    #[test]
    fn parsing_is_idempotent() {
        let text = "mlb_ID,year_ID,WAR\n1,2023,3.5\n2,2023,0.1\n3,2021,4.0\n";
        let first = parse_war_lookup(text, 2023, URL).unwrap();
        let second = parse_war_lookup(text, 2023, URL).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn dataset_urls_come_from_sources() {
        let sources = WarSources {
            batting_url: "http://a/bat.txt".into(),
            pitching_url: "http://a/pitch.txt".into(),
        };
        assert_eq!(WarDataset::Batting.url(&sources), "http://a/bat.txt");
        assert_eq!(WarDataset::Pitching.url(&sources), "http://a/pitch.txt");
    }
}
