//! Date and time range filtering for game analysis
//!
//! Ranges are built from user-supplied `YYYY-MM-DD` dates and optional
//! `HH:MM` times, validated before any network traffic happens. A bound
//! without a time of day snaps to the start or end of its day, so a
//! single-day range covers the whole day.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

use crate::error::{Error, Result};

/// How many months back an unbounded analysis looks by default.
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 12;

/// Which end of a range a parsed bound belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parse one range bound from its date and optional time components.
///
/// A missing time defaults to `00:00:00` for a start bound and
/// `23:59:59` for an end bound.
pub fn parse_bound(date: &str, time: Option<&str>, bound: Bound) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(date.to_string()))?;
    let time = match time {
        Some(t) => {
            NaiveTime::parse_from_str(t, "%H:%M").map_err(|_| Error::InvalidTime(t.to_string()))?
        }
        None => match bound {
            Bound::Start => NaiveTime::MIN,
            Bound::End => NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
        },
    };
    Ok(date.and_time(time).and_utc())
}

/// An inclusive time window over game end timestamps. Either side may be
/// open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateTimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateTimeRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(Error::InvalidRange {
                    start: s.format("%Y-%m-%d %H:%M:%S").to_string(),
                    end: e.format("%Y-%m-%d %H:%M:%S").to_string(),
                });
            }
        }
        Ok(Self { start, end })
    }

    /// Build a range straight from command-line style components.
    pub fn parse(
        start_date: Option<&str>,
        start_time: Option<&str>,
        end_date: Option<&str>,
        end_time: Option<&str>,
    ) -> Result<Self> {
        let start = start_date
            .map(|d| parse_bound(d, start_time, Bound::Start))
            .transpose()?;
        let end = end_date
            .map(|d| parse_bound(d, end_time, Bound::End))
            .transpose()?;
        Self::new(start, end)
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if timestamp > end {
                return false;
            }
        }
        true
    }

    /// The `(year, month)` archives that must be fetched to cover this
    /// range. An open end resolves to `now`; an open start falls back to
    /// [`DEFAULT_LOOKBACK_MONTHS`] before the end bound.
    pub fn fetch_months(&self, now: DateTime<Utc>) -> Vec<(i32, u32)> {
        let end = self.end.unwrap_or(now).date_naive();
        let start = match self.start {
            Some(s) => s.date_naive(),
            None => months_back(end, DEFAULT_LOOKBACK_MONTHS - 1),
        };
        months_spanned(start, end)
    }
}

/// Every `(year, month)` pair touched by the inclusive date range, in
/// chronological order. Empty when `start` is after `end`.
pub fn months_spanned(start: NaiveDate, end: NaiveDate) -> Vec<(i32, u32)> {
    let mut months = Vec::new();
    let (mut year, mut month) = (start.year(), start.month());
    let last = (end.year(), end.month());
    while (year, month) <= last {
        months.push((year, month));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    months
}

/// First day of the month `months` before the month of `date`.
pub(crate) fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month() as i32 - 1 - months as i32;
    let (year, month) = (total.div_euclid(12), total.rem_euclid(12) as u32 + 1);
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_parse_bound_defaults() {
        let start = parse_bound("2024-06-01", None, Bound::Start).unwrap();
        assert_eq!(start, utc("2024-06-01T00:00:00Z"));

        let end = parse_bound("2024-06-01", None, Bound::End).unwrap();
        assert_eq!(end, utc("2024-06-01T23:59:59Z"));
    }

    #[test]
    fn test_parse_bound_with_time() {
        let start = parse_bound("2024-06-15", Some("09:30"), Bound::Start).unwrap();
        assert_eq!(start, utc("2024-06-15T09:30:00Z"));
    }

    #[test]
    fn test_parse_bound_rejects_malformed_date() {
        let err = parse_bound("06/01/2024", None, Bound::Start).unwrap_err();
        assert!(matches!(err, Error::InvalidDate(_)));

        let err = parse_bound("2024-13-01", None, Bound::Start).unwrap_err();
        assert!(matches!(err, Error::InvalidDate(_)));
    }

    #[test]
    fn test_parse_bound_rejects_malformed_time() {
        let err = parse_bound("2024-06-01", Some("25:00"), Bound::Start).unwrap_err();
        assert!(matches!(err, Error::InvalidTime(_)));

        let err = parse_bound("2024-06-01", Some("12:30:45"), Bound::Start).unwrap_err();
        assert!(matches!(err, Error::InvalidTime(_)));
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        let err = DateTimeRange::parse(Some("2024-06-02"), None, Some("2024-06-01"), None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }

    #[test]
    fn test_single_day_range_covers_whole_day() {
        let range =
            DateTimeRange::parse(Some("2024-06-01"), None, Some("2024-06-01"), None).unwrap();
        assert!(range.contains(utc("2024-06-01T00:00:00Z")));
        assert!(range.contains(utc("2024-06-01T23:00:00Z")));
        assert!(range.contains(utc("2024-06-01T23:59:59Z")));
        assert!(!range.contains(utc("2024-06-02T00:00:01Z")));
        assert!(!range.contains(utc("2024-05-31T23:59:59Z")));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let range = DateTimeRange::parse(
            Some("2024-06-01"),
            Some("10:00"),
            Some("2024-06-01"),
            Some("12:00"),
        )
        .unwrap();
        assert!(range.contains(utc("2024-06-01T10:00:00Z")));
        assert!(range.contains(utc("2024-06-01T12:00:00Z")));
        assert!(!range.contains(utc("2024-06-01T09:59:59Z")));
        assert!(!range.contains(utc("2024-06-01T12:00:01Z")));
    }

    #[test]
    fn test_open_range_contains_everything() {
        let range = DateTimeRange::unbounded();
        assert!(range.contains(utc("1999-01-01T00:00:00Z")));
        assert!(range.contains(utc("2030-12-31T23:59:59Z")));
    }

    #[test]
    fn test_months_spanned_within_year() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert_eq!(months_spanned(start, end), vec![(2024, 3), (2024, 4), (2024, 5)]);
    }

    #[test]
    fn test_months_spanned_across_year_boundary() {
        let start = NaiveDate::from_ymd_opt(2023, 11, 20).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(
            months_spanned(start, end),
            vec![(2023, 11), (2023, 12), (2024, 1), (2024, 2)]
        );
    }

    #[test]
    fn test_months_spanned_single_month() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(months_spanned(day, day), vec![(2024, 6)]);
    }

    #[test]
    fn test_fetch_months_defaults_to_lookback() {
        let range = DateTimeRange::unbounded();
        let months = range.fetch_months(utc("2024-06-10T12:00:00Z"));
        assert_eq!(months.len(), DEFAULT_LOOKBACK_MONTHS as usize);
        assert_eq!(months.first(), Some(&(2023, 7)));
        assert_eq!(months.last(), Some(&(2024, 6)));
    }

    #[test]
    fn test_fetch_months_bounded_range() {
        let range =
            DateTimeRange::parse(Some("2024-01-15"), None, Some("2024-03-02"), None).unwrap();
        let months = range.fetch_months(utc("2024-06-10T12:00:00Z"));
        assert_eq!(months, vec![(2024, 1), (2024, 2), (2024, 3)]);
    }

    #[test]
    fn test_fetch_months_open_end_resolves_to_now() {
        let range = DateTimeRange::parse(Some("2024-04-20"), None, None, None).unwrap();
        let months = range.fetch_months(utc("2024-06-10T12:00:00Z"));
        assert_eq!(months, vec![(2024, 4), (2024, 5), (2024, 6)]);
    }
}
