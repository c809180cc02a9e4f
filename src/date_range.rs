//! Reporting windows.
//!
//! A `DateRange` is a pair of inclusive calendar dates. Timestamp columns are
//! filtered with `lower_bound() <= ts < upper_bound()`, where the upper bound
//! is the day after `to`, so readings late on the last day are kept.
//! Date-only columns use `BETWEEN from AND to`.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Format used for every date stored in or returned from the store.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Longest window a request may cover. Daily charts carry one bucket per day.
pub const MAX_RANGE_DAYS: i64 = 3_660;

/// Stored timestamps use four-digit years; anything outside cannot match.
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds when they arrive out of order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a > b {
            Self { from: b, to: a }
        } else {
            Self { from: a, to: b }
        }
    }

    /// Apply the dashboard defaults (first of the current month through
    /// today) and reject windows the store cannot be queried over.
    pub fn resolve(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, String> {
        let from = from.unwrap_or_else(|| month_start(today));
        let to = to.unwrap_or(today);
        let range = Self::new(from, to);

        for day in [range.from, range.to] {
            if !(MIN_YEAR..=MAX_YEAR).contains(&day.year()) {
                return Err(format!(
                    "{} is outside years {:04}-{:04}",
                    day.format(DATE_FORMAT),
                    MIN_YEAR,
                    MAX_YEAR
                ));
            }
        }
        if range.num_days() > MAX_RANGE_DAYS {
            return Err(format!(
                "{}..{} spans {} days, more than the {} allowed",
                range.start_str(),
                range.end_str(),
                range.num_days(),
                MAX_RANGE_DAYS
            ));
        }
        Ok(range)
    }

    /// The full calendar month before `today`'s month.
    pub fn last_month(today: NaiveDate) -> Self {
        let end = month_start(today) - Duration::days(1);
        Self {
            from: month_start(end),
            to: end,
        }
    }

    /// The window of equal length ending the day before `from`, or `None`
    /// when it would start before the earliest representable date.
    pub fn previous(&self) -> Option<Self> {
        let to = self.from.pred_opt()?;
        let from = to.checked_sub_signed(Duration::days(self.num_days() - 1))?;
        Some(Self { from, to })
    }

    /// Number of calendar days covered, both ends included.
    pub fn num_days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.from.iter_days().take(self.num_days().max(0) as usize)
    }

    pub fn start_str(&self) -> String {
        self.from.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.to.format(DATE_FORMAT).to_string()
    }

    /// Inclusive lower bound for timestamp columns.
    pub fn lower_bound(&self) -> String {
        self.start_str()
    }

    /// Exclusive upper bound for timestamp columns: the day after `to`.
    pub fn upper_bound(&self) -> String {
        self.to
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
            .format(DATE_FORMAT)
            .to_string()
    }
}

pub fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Parse an optional `YYYY-MM-DD` value. Blank input counts as absent.
pub fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|_| format!("expected YYYY-MM-DD, got '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).expect("valid date")
    }

    #[test]
    fn test_defaults_to_month_to_date() {
        let range = DateRange::resolve(None, None, d("2024-03-17")).expect("range");
        assert_eq!(range.from, d("2024-03-01"));
        assert_eq!(range.to, d("2024-03-17"));
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let range = DateRange::resolve(Some(d("2024-03-31")), Some(d("2024-03-01")), d("2024-05-01"))
            .expect("range");
        assert_eq!(range, DateRange::new(d("2024-03-01"), d("2024-03-31")));
    }

    #[test]
    fn test_upper_bound_is_day_after() {
        let range = DateRange::new(d("2024-02-01"), d("2024-02-29"));
        assert_eq!(range.lower_bound(), "2024-02-01");
        assert_eq!(range.upper_bound(), "2024-03-01");
        assert_eq!(range.num_days(), 29);
    }

    #[test]
    fn test_last_month_crosses_year() {
        let range = DateRange::last_month(d("2025-01-10"));
        assert_eq!(range.from, d("2024-12-01"));
        assert_eq!(range.to, d("2024-12-31"));
    }

    #[test]
    fn test_previous_window_has_equal_length() {
        let range = DateRange::new(d("2024-03-01"), d("2024-03-10"));
        let prev = range.previous().expect("previous");
        assert_eq!(prev.to, d("2024-02-29"));
        assert_eq!(prev.from, d("2024-02-20"));
        assert_eq!(prev.num_days(), range.num_days());
    }

    #[test]
    fn test_extreme_years_are_rejected() {
        let today = d("2024-04-15");
        let late = parse_date(Some("+262142-12-31")).expect("chrono accepts it");
        let early = parse_date(Some("-262143-01-01")).expect("chrono accepts it");
        assert!(DateRange::resolve(late, late, today).is_err());
        assert!(DateRange::resolve(early, early, today).is_err());
        assert!(DateRange::resolve(Some(d("9999-12-31")), None, today).is_err());
    }

    #[test]
    fn test_overlong_window_is_rejected() {
        let today = d("2024-04-15");
        let err = DateRange::resolve(Some(d("0001-01-01")), Some(d("9999-12-31")), today)
            .expect_err("too long");
        assert!(err.contains("3660"), "unexpected error: {err}");
        assert!(DateRange::resolve(Some(d("2020-01-01")), Some(d("2024-12-31")), today).is_ok());
    }

    #[test]
    fn test_bounds_at_calendar_edges_do_not_overflow() {
        let first = DateRange::new(NaiveDate::MIN, NaiveDate::MIN);
        assert_eq!(first.previous(), None);
        let last = DateRange::new(NaiveDate::MAX, NaiveDate::MAX);
        assert!(!last.upper_bound().is_empty());
        assert_eq!(last.days().count(), 1);
    }

    #[test]
    fn test_parse_date_blank_is_none() {
        assert_eq!(parse_date(None).expect("none"), None);
        assert_eq!(parse_date(Some("  ")).expect("blank"), None);
        assert_eq!(parse_date(Some("2024-03-05")).expect("date"), Some(d("2024-03-05")));
        assert!(parse_date(Some("05/03/2024")).is_err());
    }
}
