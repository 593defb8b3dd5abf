//! Merging fresh aggregates with previously stored ones
//!
//! A fresh analysis fully recomputes counts and rates, so those always
//! replace the stored values. What survives from the stored row is the
//! longitudinal context: the earliest analysis window start and the
//! first rating ever observed, which keeps rating_change anchored to
//! the user's earliest known baseline instead of resetting every run.

use chrono::{DateTime, Utc};

use super::aggregate::{OpeningAggregate, TimeControlAggregate, UserAggregate};

pub fn reconcile_user(new: UserAggregate, existing: Option<&UserAggregate>) -> UserAggregate {
    match existing {
        None => new,
        Some(existing) => {
            let mut merged = new;
            merged.analysis_start = earliest(merged.analysis_start, existing.analysis_start);
            merged.stats = merged.stats.with_rating_basis(existing.stats.first_rating);
            merged
        }
    }
}

pub fn reconcile_opening(
    new: OpeningAggregate,
    existing: Option<&OpeningAggregate>,
) -> OpeningAggregate {
    match existing {
        None => new,
        Some(existing) => {
            let mut merged = new;
            merged.stats = merged.stats.with_rating_basis(existing.stats.first_rating);
            merged
        }
    }
}

pub fn reconcile_time_control(
    new: TimeControlAggregate,
    existing: Option<&TimeControlAggregate>,
) -> TimeControlAggregate {
    match existing {
        None => new,
        Some(existing) => {
            let mut merged = new;
            merged.stats = merged.stats.with_rating_basis(existing.stats.first_rating);
            merged
        }
    }
}

fn earliest(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}
