//! Calendar-month window used to scope eligibility queries.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

/// First and last day of one calendar month.
///
/// Queries use the half-open timestamp range returned by [`Self::bounds`] so that a
/// record submitted at any moment of the last day is still inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityWindow {
    /// First day of the month
    pub first_day: NaiveDate,
    /// Last day of the month
    pub last_day: NaiveDate,
}

impl EligibilityWindow {
    /// The month containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let first_day = date.with_day(1).unwrap_or(date);
        let last_day = next_month_start(first_day).pred_opt().unwrap_or(first_day);
        Self {
            first_day,
            last_day,
        }
    }

    /// The month containing `now`.
    #[must_use]
    pub fn for_instant(now: DateTime<Utc>) -> Self {
        Self::containing(now.date_naive())
    }

    /// The current month.
    #[must_use]
    pub fn current() -> Self {
        Self::for_instant(Utc::now())
    }

    /// `[first_day 00:00 UTC, first day of next month 00:00 UTC)`
    #[must_use]
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            start_of_day(self.first_day),
            start_of_day(next_month_start(self.first_day)),
        )
    }

    /// Whether `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let (start, end) = self.bounds();
        instant >= start && instant < end
    }

    /// e.g. "March 2024"
    #[must_use]
    pub fn label(&self) -> String {
        self.first_day.format("%B %Y").to_string()
    }
}

fn next_month_start(first_day: NaiveDate) -> NaiveDate {
    let (year, month) = if first_day.month() == 12 {
        (first_day.year() + 1, 1)
    } else {
        (first_day.year(), first_day.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first_day)
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}
