//! Temporal helpers for batch periods and calendar bucketing
//!
//! Batches cover a date range (usually one week); audit frequency rules
//! bucket submissions by the calendar date they landed on in the portal
//! timezone, which is West Africa Time for the NHIS.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod { start: String, end: String },
}

/// Timezone wrapper with custom serialization support
///
/// Wraps chrono_tz::Tz so it can ride along in serde payloads as an IANA
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// The portal's operational timezone (West Africa Time)
    pub fn lagos() -> Self {
        Self(chrono_tz::Africa::Lagos)
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// The calendar date an instant falls on in this timezone
    ///
    /// A submission at 23:30 UTC is already the next operational day in
    /// Lagos; frequency rules count it against that day.
    pub fn calendar_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.to_local(instant).date_naive()
    }

    /// Gets the start of day (00:00:00) in this timezone as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(0, 0, 0)
            .unwrap()
            .and_local_timezone(self.0)
            .single()
            .expect("Invalid timezone conversion")
            .with_timezone(&Utc)
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// An inclusive date range, used for batch coverage periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// The Monday-to-Sunday week containing the given date
    ///
    /// Facilities normally batch one week of discharges together.
    pub fn week_containing(date: NaiveDate) -> Self {
        let days_from_monday = date.weekday().num_days_from_monday() as u64;
        let start = date - Days::new(days_from_monday);
        let end = start + Days::new(6);
        debug_assert_eq!(start.weekday(), Weekday::Mon);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days spanned, inclusive of both endpoints
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_range_rejects_inverted() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();

        assert!(DateRange::new(start, end).is_err());
    }

    #[test]
    fn test_date_range_contains() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        )
        .unwrap();

        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()));
    }

    #[test]
    fn test_week_containing_midweek_date() {
        // 2024-03-06 is a Wednesday
        let week = DateRange::week_containing(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());

        assert_eq!(week.start, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(week.end, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(week.days(), 7);
    }

    #[test]
    fn test_week_containing_monday_is_identity_start() {
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let week = DateRange::week_containing(monday);
        assert_eq!(week.start, monday);
    }

    #[test]
    fn test_calendar_date_crosses_midnight_utc() {
        // 23:30 UTC on the 5th is 00:30 WAT on the 6th
        let instant = Utc.with_ymd_and_hms(2024, 3, 5, 23, 30, 0).unwrap();
        let lagos = Timezone::lagos();

        assert_eq!(
            lagos.calendar_date(instant),
            NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
        );
    }

    #[test]
    fn test_timezone_serde_round_trip() {
        let tz = Timezone::lagos();
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Africa/Lagos\"");

        let back: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tz);
    }

    #[test]
    fn test_start_of_day_in_lagos() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let start = Timezone::lagos().start_of_day(date);

        // WAT is UTC+1 with no DST
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 5, 23, 0, 0).unwrap());
    }
}
