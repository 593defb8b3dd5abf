//! Aggregate statistics over normalized game records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::record::{GameOutcome, GameRecord};

/// Win/loss, rating, and accuracy statistics for one slice of games.
/// The same shape serves the overall, per-opening, and per-time-control
/// views.
///
/// `games_analyzed` counts every record in the slice while
/// `total_games` counts only decided ones, so `wins + losses + draws`
/// always equals `total_games`. Rating and accuracy fields are `None`
/// when no record carried the underlying value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub games_analyzed: u32,
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub win_rate: f64,
    pub current_rating: Option<u32>,
    pub highest_rating: Option<u32>,
    pub lowest_rating: Option<u32>,
    pub avg_rating: Option<f64>,
    pub first_rating: Option<u32>,
    pub rating_change: Option<i32>,
    pub avg_accuracy: Option<f64>,
    pub best_accuracy: Option<f64>,
    pub worst_accuracy: Option<f64>,
    pub games_with_accuracy: u32,
}

impl PerformanceStats {
    /// Compute statistics over chronologically ordered records.
    pub(crate) fn from_records(records: &[&GameRecord]) -> Self {
        let mut stats = PerformanceStats {
            games_analyzed: records.len() as u32,
            ..Default::default()
        };

        for record in records {
            match record.outcome {
                GameOutcome::Win => stats.wins += 1,
                GameOutcome::Loss => stats.losses += 1,
                GameOutcome::Draw => stats.draws += 1,
                GameOutcome::Unknown => {}
            }
        }
        stats.total_games = stats.wins + stats.losses + stats.draws;
        if stats.total_games > 0 {
            stats.win_rate = stats.wins as f64 * 100.0 / stats.total_games as f64;
        }

        let ratings: Vec<u32> = records.iter().filter_map(|r| r.rating).collect();
        if !ratings.is_empty() {
            stats.highest_rating = ratings.iter().copied().max();
            stats.lowest_rating = ratings.iter().copied().min();
            stats.avg_rating =
                Some(ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / ratings.len() as f64);
        }
        stats.first_rating = records.iter().find_map(|r| r.rating);
        stats.current_rating = records.iter().rev().find_map(|r| r.rating);
        stats.rating_change = match (stats.current_rating, stats.first_rating) {
            (Some(current), Some(first)) => Some(current as i32 - first as i32),
            _ => None,
        };

        let accuracies: Vec<f64> = records.iter().filter_map(|r| r.accuracy).collect();
        stats.games_with_accuracy = accuracies.len() as u32;
        if !accuracies.is_empty() {
            stats.avg_accuracy =
                Some(accuracies.iter().sum::<f64>() / accuracies.len() as f64);
            stats.best_accuracy = accuracies.iter().copied().reduce(f64::max);
            stats.worst_accuracy = accuracies.iter().copied().reduce(f64::min);
        }

        stats
    }

    /// Re-anchor the rating baseline on an earlier known rating, keeping
    /// `rating_change` consistent with it.
    pub fn with_rating_basis(mut self, first: Option<u32>) -> Self {
        if let Some(first) = first {
            self.first_rating = Some(first);
            self.rating_change = self
                .current_rating
                .map(|current| current as i32 - first as i32);
        }
        self
    }
}

/// Overall statistics for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAggregate {
    pub username: String,
    pub stats: PerformanceStats,
    pub analysis_start: Option<DateTime<Utc>>,
    pub analysis_end: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

/// Statistics for one user and one opening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningAggregate {
    pub username: String,
    pub opening: String,
    pub stats: PerformanceStats,
    pub last_updated: DateTime<Utc>,
}

/// Statistics for one user and one raw time-control string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeControlAggregate {
    pub username: String,
    pub time_control: String,
    pub stats: PerformanceStats,
    pub last_updated: DateTime<Utc>,
}

/// Records ordered by end time; ties keep game URL order so repeated
/// runs pick the same "latest" record.
fn chronological(records: &[GameRecord]) -> Vec<&GameRecord> {
    let mut ordered: Vec<&GameRecord> = records.iter().collect();
    ordered.sort_by(|a, b| {
        a.played_at
            .cmp(&b.played_at)
            .then_with(|| a.game_url.cmp(&b.game_url))
    });
    ordered
}

fn partition_by<K, F>(records: &[GameRecord], key: F) -> BTreeMap<K, Vec<&GameRecord>>
where
    K: Ord,
    F: Fn(&GameRecord) -> K,
{
    let mut groups: BTreeMap<K, Vec<&GameRecord>> = BTreeMap::new();
    for record in chronological(records) {
        groups.entry(key(record)).or_default().push(record);
    }
    groups
}

/// Aggregate all of a user's records into one overall view.
pub fn aggregate_user(username: &str, records: &[GameRecord]) -> UserAggregate {
    let ordered = chronological(records);
    UserAggregate {
        username: username.to_string(),
        stats: PerformanceStats::from_records(&ordered),
        analysis_start: ordered.first().map(|r| r.played_at),
        analysis_end: ordered.last().map(|r| r.played_at),
        last_updated: Utc::now(),
    }
}

/// Per-opening aggregates, most played first, ties by opening name.
pub fn aggregate_openings(username: &str, records: &[GameRecord]) -> Vec<OpeningAggregate> {
    let now = Utc::now();
    let mut aggregates: Vec<OpeningAggregate> = partition_by(records, |r| r.opening.clone())
        .into_iter()
        .map(|(opening, group)| OpeningAggregate {
            username: username.to_string(),
            opening,
            stats: PerformanceStats::from_records(&group),
            last_updated: now,
        })
        .collect();
    aggregates.sort_by(|a, b| {
        b.stats
            .games_analyzed
            .cmp(&a.stats.games_analyzed)
            .then_with(|| a.opening.cmp(&b.opening))
    });
    aggregates
}

/// Per-time-control aggregates, most played first, ties by control
/// string. Time controls stay raw (`600`, `180+2`, `1/86400`).
pub fn aggregate_time_controls(
    username: &str,
    records: &[GameRecord],
) -> Vec<TimeControlAggregate> {
    let now = Utc::now();
    let mut aggregates: Vec<TimeControlAggregate> =
        partition_by(records, |r| r.time_control.clone())
            .into_iter()
            .map(|(time_control, group)| TimeControlAggregate {
                username: username.to_string(),
                time_control,
                stats: PerformanceStats::from_records(&group),
                last_updated: now,
            })
            .collect();
    aggregates.sort_by(|a, b| {
        b.stats
            .games_analyzed
            .cmp(&a.stats.games_analyzed)
            .then_with(|| a.time_control.cmp(&b.time_control))
    });
    aggregates
}
