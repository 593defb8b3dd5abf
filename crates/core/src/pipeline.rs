//! Per-user analysis pipeline
//!
//! One `analyze_user` call runs the whole chain for one player: verify
//! the user exists, fetch archives, normalize, filter, aggregate, and
//! optionally persist. Bad individual games are skipped with a reason
//! and never abort the run; an unreachable database downgrades the run
//! to fetch-and-report instead of failing it.

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::analysis::{
    aggregate_openings, aggregate_time_controls, aggregate_user, normalize, reconcile_opening,
    reconcile_time_control, reconcile_user, GameRecord, OpeningAggregate, TimeControlAggregate,
    UserAggregate,
};
use crate::chesscom::{ApiGame, ChessComClient, PlayerProfile, DEFAULT_RECENT_GAMES};
use crate::error::{Error, Result};
use crate::filter::DateTimeRange;
use crate::storage::Database;

/// What to analyze for one user.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Window over game end times. Unbounded means "recent games".
    pub range: DateTimeRange,
    /// Keep only the most recent N records after filtering.
    pub max_games: Option<usize>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            range: DateTimeRange::unbounded(),
            max_games: Some(DEFAULT_RECENT_GAMES),
        }
    }
}

/// A fetched game that could not be normalized, and why.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedGame {
    pub url: String,
    pub reason: String,
}

/// Everything one analysis run produced for one user.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub username: String,
    pub profile: PlayerProfile,
    /// Raw games fetched before filtering and deduplication.
    pub total_fetched: usize,
    /// Included records in chronological order.
    pub records: Vec<GameRecord>,
    pub user: UserAggregate,
    pub openings: Vec<OpeningAggregate>,
    pub time_controls: Vec<TimeControlAggregate>,
    pub skipped: Vec<SkippedGame>,
    /// Set when a database was requested but could not be used; the
    /// rest of the analysis is still valid.
    pub persistence_error: Option<String>,
}

/// Normalize a fetched batch for `username` and keep what falls in
/// `range`.
///
/// Records that fail to normalize are reported in the skip list, games
/// outside the range are silently excluded, and refetched URLs collapse
/// to their latest occurrence. The result is ordered by end time with
/// URL as the tie-break.
pub fn process_games(
    games: &[ApiGame],
    username: &str,
    range: &DateTimeRange,
) -> (Vec<GameRecord>, Vec<SkippedGame>) {
    let mut by_url: BTreeMap<String, GameRecord> = BTreeMap::new();
    let mut skipped = Vec::new();

    for game in games {
        match normalize(game, username) {
            Ok(record) => {
                if range.contains(record.played_at) {
                    by_url.insert(record.game_url.clone(), record);
                }
            }
            Err(e) => {
                warn!("skipping game {}: {}", game.url, e);
                skipped.push(SkippedGame {
                    url: game.url.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let mut records: Vec<GameRecord> = by_url.into_values().collect();
    records.sort_by(|a, b| {
        a.played_at
            .cmp(&b.played_at)
            .then_with(|| a.game_url.cmp(&b.game_url))
    });
    (records, skipped)
}

/// Fetch, normalize, aggregate, and optionally persist one user's
/// games.
///
/// `UserNotFound` surfaces from the profile check so batch drivers can
/// skip the user; later archive fetches treat a 404 month as empty.
pub async fn analyze_user(
    client: &ChessComClient,
    db: Option<&Database>,
    username: &str,
    options: &AnalysisOptions,
) -> Result<Analysis> {
    let profile = client.profile(username).await?;
    let now = Utc::now();

    let raw = match (options.range.is_unbounded(), options.max_games) {
        (true, Some(max)) => client.recent_games(username, max, now).await?,
        _ => {
            let mut all = Vec::new();
            for (year, month) in options.range.fetch_months(now) {
                match client.monthly_games(username, year, month).await {
                    Ok(games) => all.extend(games),
                    // archive months with no games can 404; the profile
                    // check above already proved the user exists
                    Err(Error::UserNotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
            all
        }
    };

    let total_fetched = raw.len();
    let (mut records, skipped) = process_games(&raw, username, &options.range);
    if let Some(max) = options.max_games {
        if records.len() > max {
            records = records.split_off(records.len() - max);
        }
    }

    let mut persistence_error = None;
    let prior = match db {
        Some(db) => match db.load_user_stats(username) {
            Ok(prior) => prior,
            Err(e) => {
                warn!("persistence unavailable for {}: {}", username, e);
                persistence_error = Some(e.to_string());
                None
            }
        },
        None => None,
    };

    let user = reconcile_user(aggregate_user(username, &records), prior.as_ref());
    let mut openings = aggregate_openings(username, &records);
    let mut time_controls = aggregate_time_controls(username, &records);

    if let Some(db) = db {
        if persistence_error.is_none() {
            if let Err(e) =
                persist_analysis(db, username, &records, &user, &mut openings, &mut time_controls)
            {
                warn!("failed to persist analysis for {}: {}", username, e);
                persistence_error = Some(e.to_string());
            }
        }
    }

    Ok(Analysis {
        username: username.to_string(),
        profile,
        total_fetched,
        records,
        user,
        openings,
        time_controls,
        skipped,
        persistence_error,
    })
}

/// Store records and aggregates, merging each aggregate with whatever
/// the database already holds for its key.
fn persist_analysis(
    db: &Database,
    username: &str,
    records: &[GameRecord],
    user: &UserAggregate,
    openings: &mut [OpeningAggregate],
    time_controls: &mut [TimeControlAggregate],
) -> Result<()> {
    db.upsert_games(username, records)?;
    db.save_user_stats(user)?;

    for aggregate in openings.iter_mut() {
        let existing = db.load_opening_stats(username, &aggregate.opening)?;
        *aggregate = reconcile_opening(aggregate.clone(), existing.as_ref());
        db.save_opening_stats(aggregate)?;
    }
    for aggregate in time_controls.iter_mut() {
        let existing = db.load_time_control_stats(username, &aggregate.time_control)?;
        *aggregate = reconcile_time_control(aggregate.clone(), existing.as_ref());
        db.save_time_control_stats(aggregate)?;
    }
    Ok(())
}
