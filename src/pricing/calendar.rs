//! Civil-date handling for stays and seasons.
//!
//! All pricing works on calendar dates in the property's local calendar.
//! Timestamps are shifted into a fixed UTC offset before the date is taken,
//! so a late-evening UTC timestamp lands on the right local day and no DST
//! rules are involved.
//!
//! Two interval conventions live here:
//! - [`DateRange`] is half-open `[start, end)`, used for stays and reservations
//!   (the check-out day is free for the next guest).
//! - [`SeasonWindow`] is closed `[start, end]`, used for seasonal pricing rules.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use super::error::PricingError;

/// Offset used when none is configured (UTC+7).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;

/// Longest stay that can be quoted when none is configured.
pub const DEFAULT_MAX_STAY_NIGHTS: u32 = 365;

/// Converts user-supplied date strings into civil dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilCalendar {
    offset: FixedOffset,
    max_stay_nights: u32,
}

impl CivilCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            max_stay_nights: DEFAULT_MAX_STAY_NIGHTS,
        }
    }

    pub fn with_max_stay_nights(self, max_stay_nights: u32) -> Self {
        Self {
            max_stay_nights,
            ..self
        }
    }

    /// Build a calendar from a whole-hour UTC offset. Returns `None` when the
    /// offset is outside +/-23 hours.
    pub fn from_utc_offset_hours(hours: i32) -> Option<Self> {
        if !(-23..=23).contains(&hours) {
            return None;
        }
        FixedOffset::east_opt(hours * 3600).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn max_stay_nights(&self) -> u32 {
        self.max_stay_nights
    }

    /// Parse an ISO-8601 date (`2024-03-01`) or an RFC 3339 timestamp
    /// (`2024-03-01T17:00:00Z`). Timestamps are converted to this calendar's
    /// offset before the date part is taken.
    pub fn parse_date(&self, input: &str) -> Result<NaiveDate, PricingError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PricingError::invalid_range("date is empty"));
        }

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(date);
        }

        DateTime::parse_from_rfc3339(trimmed)
            .map(|ts| ts.with_timezone(&self.offset).date_naive())
            .map_err(|_| {
                PricingError::invalid_range(format!("'{}' is not an ISO-8601 date", trimmed))
            })
    }

    /// Parse both ends of a stay, validate `check_in < check_out` and cap the
    /// length at `max_stay_nights`.
    pub fn parse_stay(&self, check_in: &str, check_out: &str) -> Result<DateRange, PricingError> {
        let start = self.parse_date(check_in)?;
        let end = self.parse_date(check_out)?;
        DateRange::checked(start, end)?.limited_to(self.max_stay_nights)
    }
}

impl Default for CivilCalendar {
    fn default() -> Self {
        Self::from_utc_offset_hours(DEFAULT_UTC_OFFSET_HOURS)
            .unwrap_or_else(|| Self::new(Utc.fix()))
    }
}

/// Number of nights between two dates (negative when `to` precedes `from`).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Build a range for a stay, rejecting empty or inverted ranges.
    pub fn checked(start: NaiveDate, end: NaiveDate) -> Result<Self, PricingError> {
        if start >= end {
            return Err(PricingError::invalid_range(format!(
                "check-in {} must be before check-out {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Reject ranges longer than `max_nights`.
    pub fn limited_to(self, max_nights: u32) -> Result<Self, PricingError> {
        if self.nights_count() > i64::from(max_nights) {
            return Err(PricingError::invalid_range(format!(
                "stay of {} nights exceeds the maximum of {}",
                self.nights_count(),
                max_nights
            )));
        }
        Ok(self)
    }

    pub fn nights_count(&self) -> i64 {
        days_between(self.start, self.end)
    }

    /// Every night of the range: `start` inclusive, `end` exclusive.
    pub fn nights(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d < end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Closed date window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SeasonWindow {
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Days covered, counting both ends. Zero for an inverted window.
    pub fn span_days(&self) -> i64 {
        (days_between(self.start, self.end) + 1).max(0)
    }

    /// Shared part of two windows, if any.
    pub fn intersection(&self, other: &SeasonWindow) -> Option<SeasonWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(SeasonWindow { start, end })
    }
}

/// Resolve a day-month pair in a given year. 29 February falls back to the
/// 28th in non-leap years.
pub fn day_month_in_year(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
        if month == 2 && day == 29 {
            NaiveDate::from_ymd_opt(year, 2, 28)
        } else {
            None
        }
    })
}
