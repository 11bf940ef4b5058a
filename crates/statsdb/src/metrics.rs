// Comparable per-player metrics and nearest-neighbour search across seasons.
//
// Hitters are compared on AVG, OBP, OPS, WAR, BB% and K%; pitchers on ERA,
// WAR, BB% and SO%. Distance is the plain sum of absolute differences.

use serde_json::Value;

use crate::model::{PlayerStatRecord, StatGroup, StatLine, StatsDatabase};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerMetrics {
    Hitter {
        avg: Option<f64>,
        obp: Option<f64>,
        ops: Option<f64>,
        war: Option<f64>,
        /// Walks per 100 plate appearances.
        bb_pct: f64,
        /// Strikeouts per 100 plate appearances.
        k_pct: f64,
    },
    Pitcher {
        era: Option<f64>,
        war: Option<f64>,
        /// Walks per 100 batters faced.
        bb_pct: f64,
        /// Strikeouts per 100 batters faced.
        so_pct: f64,
    },
}

/// The closest match found by [`find_most_similar`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarPlayer<'a> {
    pub record: &'a PlayerStatRecord,
    /// Season key the match was found under.
    pub season: &'a str,
    pub distance: f64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Numeric value of a stat as the API sends it: a JSON number or a string
/// such as `".300"`. Placeholders like `".---"` yield `None`.
fn numeric(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn rate(count: Option<&Value>, denominator: Option<&Value>) -> f64 {
    match numeric(denominator) {
        Some(d) if d > 0.0 => numeric(count).unwrap_or(0.0) / d * 100.0,
        _ => 0.0,
    }
}

fn abs_diff(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some((a? - b?).abs())
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

impl PlayerMetrics {
    pub fn from_stat(stat: &StatLine, group: StatGroup) -> Self {
        match group {
            StatGroup::Hitting => PlayerMetrics::Hitter {
                avg: numeric(stat.avg.as_ref()),
                obp: numeric(stat.obp.as_ref()),
                ops: numeric(stat.ops.as_ref()),
                war: stat.war_value(),
                bb_pct: rate(stat.base_on_balls.as_ref(), stat.plate_appearances.as_ref()),
                k_pct: rate(stat.strike_outs.as_ref(), stat.plate_appearances.as_ref()),
            },
            StatGroup::Pitching => PlayerMetrics::Pitcher {
                era: numeric(stat.era.as_ref()),
                war: stat.war_value(),
                bb_pct: rate(stat.base_on_balls.as_ref(), stat.batters_faced.as_ref()),
                so_pct: rate(stat.strike_outs.as_ref(), stat.batters_faced.as_ref()),
            },
        }
    }
}

/// Distance between two players of the same group; lower is more similar.
///
/// WAR counts only when both sides have it. `None` when the groups differ or
/// a required rate stat (AVG/OBP/OPS or ERA) is missing on either side.
pub fn similarity(a: &PlayerMetrics, b: &PlayerMetrics) -> Option<f64> {
    match (a, b) {
        (
            PlayerMetrics::Hitter {
                avg,
                obp,
                ops,
                war,
                bb_pct,
                k_pct,
            },
            PlayerMetrics::Hitter {
                avg: avg_b,
                obp: obp_b,
                ops: ops_b,
                war: war_b,
                bb_pct: bb_b,
                k_pct: k_b,
            },
        ) => Some(
            abs_diff(*avg, *avg_b)?
                + abs_diff(*obp, *obp_b)?
                + abs_diff(*ops, *ops_b)?
                + abs_diff(*war, *war_b).unwrap_or(0.0)
                + (bb_pct - bb_b).abs()
                + (k_pct - k_b).abs(),
        ),
        (
            PlayerMetrics::Pitcher {
                era,
                war,
                bb_pct,
                so_pct,
            },
            PlayerMetrics::Pitcher {
                era: era_b,
                war: war_b,
                bb_pct: bb_b,
                so_pct: so_b,
            },
        ) => Some(
            abs_diff(*era, *era_b)?
                + abs_diff(*war, *war_b).unwrap_or(0.0)
                + (bb_pct - bb_b).abs()
                + (so_pct - so_b).abs(),
        ),
        _ => None,
    }
}

/// Find the player-season in `group` closest to `player_id`'s line in
/// `season`, searching every season in the database.
///
/// Only the target's own line is skipped, so the same player in another
/// season is a valid match. Candidates without a comparable line are skipped;
/// on equal distance the earlier season, then the earlier record, wins.
pub fn find_most_similar<'a>(
    db: &'a StatsDatabase,
    group: StatGroup,
    season: &str,
    player_id: u64,
) -> Option<SimilarPlayer<'a>> {
    let target = db.season(group, season).iter().find(|r| r.id == player_id)?;
    let target_metrics = PlayerMetrics::from_stat(&target.stat, group);

    let mut best: Option<SimilarPlayer<'a>> = None;
    for (year, records) in db.group(group) {
        for record in records {
            if record.id == player_id && year == season {
                continue;
            }
            let metrics = PlayerMetrics::from_stat(&record.stat, group);
            let Some(distance) = similarity(&target_metrics, &metrics) else {
                continue;
            };
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(SimilarPlayer {
                    record,
                    season: year,
                    distance,
                });
            }
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
