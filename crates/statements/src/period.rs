//! Statement period scoping.
//!
//! Scopes resolve to an inclusive UTC range. Month/year ends are the last
//! second before the next period; custom ends are inclusive end-of-day.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use pressbill_core::{DomainError, DomainResult};

/// Inclusive UTC time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// Requested statement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "scope")]
pub enum StatementScope {
    Month { year: i32, month: u32 },
    Year { year: i32 },
    Custom { start: NaiveDate, end: NaiveDate },
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn month_start(year: i32, month: u32) -> DomainResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DomainError::validation(format!("invalid year/month: {year}-{month}")))
}

impl StatementScope {
    /// Resolve to the inclusive UTC range this scope covers.
    pub fn resolve(&self) -> DomainResult<DateRange> {
        match *self {
            StatementScope::Year { year } => {
                let start = month_start(year, 1)?;
                let next = month_start(year + 1, 1)?;
                Ok(DateRange {
                    start: start_of_day(start),
                    end: start_of_day(next) - Duration::seconds(1),
                })
            }
            StatementScope::Month { year, month } => {
                let start = month_start(year, month)?;
                let next = if month == 12 {
                    month_start(year + 1, 1)?
                } else {
                    month_start(year, month + 1)?
                };
                Ok(DateRange {
                    start: start_of_day(start),
                    end: start_of_day(next) - Duration::seconds(1),
                })
            }
            StatementScope::Custom { start, end } => {
                if end < start {
                    return Err(DomainError::validation("statement end precedes start"));
                }
                Ok(DateRange {
                    start: start_of_day(start),
                    end: start_of_day(end) + Duration::days(1) - Duration::seconds(1),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn month_range_covers_full_month() {
        let r = StatementScope::Month { year: 2024, month: 2 }.resolve().unwrap();
        assert_eq!(r.start, utc(2024, 2, 1, 0, 0, 0));
        // Leap year February.
        assert_eq!(r.end, utc(2024, 2, 29, 23, 59, 59));
    }

    #[test]
    fn december_rolls_over_to_next_year() {
        let r = StatementScope::Month { year: 2023, month: 12 }.resolve().unwrap();
        assert_eq!(r.end, utc(2023, 12, 31, 23, 59, 59));
    }

    #[test]
    fn year_range_is_inclusive() {
        let r = StatementScope::Year { year: 2024 }.resolve().unwrap();
        assert_eq!(r.start, utc(2024, 1, 1, 0, 0, 0));
        assert_eq!(r.end, utc(2024, 12, 31, 23, 59, 59));
        assert!(r.contains(utc(2024, 6, 15, 12, 0, 0)));
        assert!(!r.contains(utc(2025, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn custom_end_is_end_of_day() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        let r = StatementScope::Custom { start, end }.resolve().unwrap();
        assert!(r.contains(utc(2024, 3, 12, 23, 59, 59)));
        assert!(!r.contains(utc(2024, 3, 13, 0, 0, 0)));
    }

    #[test]
    fn custom_rejects_inverted_range() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(StatementScope::Custom { start, end }.resolve().is_err());
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(StatementScope::Month { year: 2024, month: 13 }.resolve().is_err());
    }
}
