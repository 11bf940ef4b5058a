// Fetch, merge and persist: one complete run.
//
// Order of operations:
// 1. Hitting stats
// 2. Pitching stats
// 3. Batting WAR
// 4. Pitching WAR
// 5. Attach WAR to each record
// 6. Write the database
//
// Any failure returns before step 6, so a failed run never touches the output
// file.

use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::database::PersistenceError;
use crate::fetch::{self, FetchError, StatsFetcher, WarDataset, WarFetcher};
use crate::model::{PlayerStatRecord, StatGroup, StatsDatabase, WarLookup};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Set `stat.war` on every record from `lookup`, by id. Records without an
/// entry get `None`. Returns the number of records that matched.
pub fn attach_war(records: &mut [PlayerStatRecord], lookup: &WarLookup) -> usize {
    let mut matched = 0;
    for record in records.iter_mut() {
        record.stat.war = lookup.war_for(record.id).map(str::to_owned);
        if record.stat.war.is_some() {
            matched += 1;
        }
    }
    matched
}

/// Fetch all four sources and build the merged database without writing it.
pub async fn build(config: &Config) -> Result<StatsDatabase, FetchError> {
    let http = fetch::build_http_client()?;
    let stats = StatsFetcher::new(http.clone(), config);
    let war = WarFetcher::new(http, config);

    let mut hitters = stats.fetch(StatGroup::Hitting).await?;
    let mut pitchers = stats.fetch(StatGroup::Pitching).await?;
    let bat_war = war.fetch(WarDataset::Batting).await?;
    let pit_war = war.fetch(WarDataset::Pitching).await?;

    let hit_matched = attach_war(&mut hitters, &bat_war);
    let pit_matched = attach_war(&mut pitchers, &pit_war);
    info!(
        "WAR attached: {}/{} hitters, {}/{} pitchers",
        hit_matched,
        hitters.len(),
        pit_matched,
        pitchers.len()
    );

    Ok(StatsDatabase::for_season(config.season, hitters, pitchers))
}

/// Build the database and write it to `config.output_path`.
pub async fn run(config: &Config) -> Result<StatsDatabase, PipelineError> {
    info!("Starting stats database run for season {}", config.season);

    let db = build(config).await?;
    db.write(&config.output_path)?;
    Ok(db)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
