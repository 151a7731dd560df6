use thiserror::Error;
use time::{Date, Duration, Month, Time};

/// Longest span a single range operation may cover.
pub const MAX_RANGE_DAYS: i64 = 365;

/// Longest target span for week duplication.
pub const MAX_DUPLICATION_DAYS: i64 = 366;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Date range spans {days} days, maximum is {max}")]
    RangeTooLarge { days: i64, max: i64 },
}

/// Parse a "YYYY-MM-DD" string into a calendar date by splitting on its
/// components. The resulting day is stable regardless of the host timezone,
/// which is why every other date computation in this module goes through
/// here instead of a generic datetime parser.
pub fn parse_local_date(s: &str) -> Result<Date, CalendarError> {
    let invalid = || CalendarError::InvalidDate(s.to_string());

    let mut parts = s.splitn(3, '-');
    let year: i32 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;
    let month: u8 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;
    let day: u8 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;

    let month = Month::try_from(month).map_err(|_| invalid())?;
    Date::from_calendar_date(year, month, day).map_err(|_| invalid())
}

/// Parse a 24h "HH:MM" string into a time of day.
pub fn parse_local_time(s: &str) -> Result<Time, CalendarError> {
    let invalid = || CalendarError::InvalidTime(s.to_string());

    let mut parts = s.splitn(2, ':');
    let hour: u8 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;
    let minute: u8 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;

    Time::from_hms(hour, minute, 0).map_err(|_| invalid())
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Weekday index, 0 = Sunday .. 6 = Saturday.
pub fn day_of_week(date: Date) -> u8 {
    date.weekday().number_days_from_sunday()
}

/// Every calendar day from `start` to `end` inclusive, ascending. Empty when
/// `end < start`. Spans beyond [`MAX_RANGE_DAYS`] are rejected to bound the
/// cost of range mutations.
pub fn inclusive_date_range(start: Date, end: Date) -> Result<Vec<Date>, CalendarError> {
    if end < start {
        return Ok(Vec::new());
    }

    let span = days_between(start, end);
    if span > MAX_RANGE_DAYS {
        return Err(CalendarError::RangeTooLarge {
            days: span,
            max: MAX_RANGE_DAYS,
        });
    }

    let mut dates = Vec::with_capacity(span as usize + 1);
    let mut current = start;
    while current <= end {
        dates.push(current);
        current = match current.next_day() {
            Some(next) => next,
            None => break,
        };
    }
    Ok(dates)
}

/// The Monday that starts the ISO week containing `date`.
pub fn monday_of_week(date: Date) -> Date {
    date - Duration::days(i64::from(date.weekday().number_days_from_monday()))
}

/// Signed whole days from `a` to `b`.
pub fn days_between(a: Date, b: Date) -> i64 {
    (b - a).whole_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Weekday;

    #[test]
    fn parses_calendar_dates_by_component() {
        let date = parse_local_date("2024-03-01").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), Month::March);
        assert_eq!(date.day(), 1);
        assert_eq!(date.weekday(), Weekday::Friday);
    }

    #[test]
    fn parses_leap_day() {
        let date = parse_local_date("2024-02-29").unwrap();
        assert_eq!(date.day(), 29);
        assert!(parse_local_date("2023-02-29").is_err());
    }

    #[test]
    fn rejects_malformed_dates() {
        for s in ["2024-13-01", "2024-00-10", "2024-01-32", "March 1", "2024/03/01", ""] {
            assert!(parse_local_date(s).is_err(), "accepted {s:?}");
        }
    }

    #[test]
    fn format_round_trips() {
        for s in ["2024-03-01", "1999-12-31", "2024-02-29"] {
            assert_eq!(format_date(parse_local_date(s).unwrap()), s);
        }
    }

    #[test]
    fn parses_times() {
        assert_eq!(parse_local_time("09:30").unwrap(), Time::from_hms(9, 30, 0).unwrap());
        assert_eq!(parse_local_time("00:00").unwrap(), Time::MIDNIGHT);
        assert!(parse_local_time("24:00").is_err());
        assert!(parse_local_time("9h30").is_err());
    }

    #[test]
    fn weekday_index_is_sunday_based() {
        // 2024-03-03 is a Sunday
        assert_eq!(day_of_week(parse_local_date("2024-03-03").unwrap()), 0);
        assert_eq!(day_of_week(parse_local_date("2024-03-04").unwrap()), 1);
        assert_eq!(day_of_week(parse_local_date("2024-03-09").unwrap()), 6);
    }

    #[test]
    fn range_is_inclusive_and_ascending() {
        let start = parse_local_date("2024-02-27").unwrap();
        let end = parse_local_date("2024-03-02").unwrap();
        let range = inclusive_date_range(start, end).unwrap();
        assert_eq!(range.len(), 5);
        assert_eq!(range.first().copied(), Some(start));
        assert_eq!(range.last().copied(), Some(end));
        assert_eq!(format_date(range[2]), "2024-02-29");
    }

    #[test]
    fn inverted_range_is_empty() {
        let start = parse_local_date("2024-03-10").unwrap();
        let end = parse_local_date("2024-03-01").unwrap();
        assert!(inclusive_date_range(start, end).unwrap().is_empty());
    }

    #[test]
    fn oversized_range_is_rejected() {
        let start = parse_local_date("2024-01-01").unwrap();
        let end = parse_local_date("2025-06-01").unwrap();
        assert!(matches!(
            inclusive_date_range(start, end),
            Err(CalendarError::RangeTooLarge { .. })
        ));
    }

    #[test]
    fn monday_of_week_normalizes_any_weekday() {
        let monday = parse_local_date("2024-03-04").unwrap();
        for s in ["2024-03-04", "2024-03-06", "2024-03-09", "2024-03-10"] {
            assert_eq!(monday_of_week(parse_local_date(s).unwrap()), monday);
        }
        // A Monday maps to itself
        assert_eq!(monday_of_week(monday), monday);
    }

    #[test]
    fn days_between_is_signed() {
        let a = parse_local_date("2024-03-01").unwrap();
        let b = parse_local_date("2024-03-08").unwrap();
        assert_eq!(days_between(a, b), 7);
        assert_eq!(days_between(b, a), -7);
    }
}
