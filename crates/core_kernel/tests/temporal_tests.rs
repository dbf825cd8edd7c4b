//! Unit tests for the temporal module
//!
//! Covers batch date ranges, week derivation, and portal-timezone
//! calendar bucketing.

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::{DateRange, TemporalError, Timezone};

mod date_ranges {
    use super::*;

    #[test]
    fn test_single_day_range_is_valid() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let range = DateRange::new(day, day).unwrap();
        assert_eq!(range.days(), 1);
        assert!(range.contains(day));
    }

    #[test]
    fn test_inverted_range_reports_both_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 13).unwrap();

        let err = DateRange::new(start, end).unwrap_err();
        assert_eq!(
            err,
            TemporalError::InvalidPeriod {
                start: "2024-05-20".to_string(),
                end: "2024-05-13".to_string(),
            }
        );
    }

    #[test]
    fn test_range_serde_round_trip() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 5, 13).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 19).unwrap(),
        )
        .unwrap();

        let json = serde_json::to_string(&range).unwrap();
        let back: DateRange = serde_json::from_str(&json).unwrap();
        assert_eq!(range, back);
    }
}

mod weekly_batches {
    use super::*;

    #[test]
    fn test_sunday_belongs_to_the_ending_week() {
        // 2024-05-19 is a Sunday
        let sunday = NaiveDate::from_ymd_opt(2024, 5, 19).unwrap();
        let week = DateRange::week_containing(sunday);

        assert_eq!(week.start, NaiveDate::from_ymd_opt(2024, 5, 13).unwrap());
        assert_eq!(week.end, sunday);
    }

    #[test]
    fn test_week_spans_month_boundary() {
        // 2024-04-30 is a Tuesday; its week runs Apr 29 to May 5
        let tuesday = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        let week = DateRange::week_containing(tuesday);

        assert_eq!(week.start, NaiveDate::from_ymd_opt(2024, 4, 29).unwrap());
        assert_eq!(week.end, NaiveDate::from_ymd_opt(2024, 5, 5).unwrap());
    }
}

mod calendar_bucketing {
    use super::*;

    #[test]
    fn test_lagos_is_one_hour_ahead_of_utc() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 13, 12, 0, 0).unwrap();
        let local = Timezone::lagos().to_local(instant);
        assert_eq!(local.to_string(), "2024-05-13 13:00:00 WAT");
    }

    #[test]
    fn test_same_utc_instant_different_dates_by_zone() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 13, 23, 30, 0).unwrap();

        let utc_date = Timezone::default().calendar_date(instant);
        let lagos_date = Timezone::lagos().calendar_date(instant);

        assert_eq!(utc_date, NaiveDate::from_ymd_opt(2024, 5, 13).unwrap());
        assert_eq!(lagos_date, NaiveDate::from_ymd_opt(2024, 5, 14).unwrap());
    }

    #[test]
    fn test_unknown_timezone_fails_deserialization() {
        let result: Result<Timezone, _> = serde_json::from_str("\"Africa/Nowhere\"");
        assert!(result.is_err());
    }
}
