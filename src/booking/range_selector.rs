use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;

use crate::scheduling::calendar::{days_between, format_date, inclusive_date_range};

/// How a service is billed, which decides what the booking widget collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingMode {
    /// Single date + single start time.
    Hourly,
    /// Date range, no time-of-day granularity.
    Daily,
    /// Date range; a same-day range additionally collects start and end
    /// times when the service allows range booking.
    Flexible,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("End date {1} is before start date {0}")]
    InvalidDateRange(String, String),

    #[error("A start time is required for this billing mode")]
    MissingStartTime,

    #[error("An end time is required for a same-day ranged booking")]
    MissingEndTime,

    #[error("End time {end} must be after start time {start}")]
    EndNotAfterStart { start: String, end: String },
}

/// Fixed time-of-day buckets candidates are generated from, half-hour steps.
const MORNING: (u8, u8) = (6, 12);
const AFTERNOON: (u8, u8) = (12, 18);
const EVENING: (u8, u8) = (18, 22);

fn bucket_times((from_hour, to_hour): (u8, u8), out: &mut Vec<String>) {
    let mut hour = from_hour;
    while hour < to_hour {
        out.push(format!("{hour:02}:00"));
        out.push(format!("{hour:02}:30"));
        hour += 1;
    }
}

/// All candidate start times inside the announcer's declared accept window,
/// `[accept_from, accept_to]` inclusive. Zero-padded "HH:MM" strings compare
/// lexicographically in time order, so this is a pure string filter.
pub fn candidate_time_slots(accept_from: &str, accept_to: &str) -> Vec<String> {
    let mut all = Vec::new();
    bucket_times(MORNING, &mut all);
    bucket_times(AFTERNOON, &mut all);
    bucket_times(EVENING, &mut all);

    all.retain(|t| t.as_str() >= accept_from && t.as_str() <= accept_to);
    all
}

/// End-time choices for a same-day ranged booking: strictly after the chosen
/// start.
pub fn end_time_choices(candidates: &[String], start: &str) -> Vec<String> {
    candidates
        .iter()
        .filter(|t| t.as_str() > start)
        .cloned()
        .collect()
}

/// A client's date/time choice, validated against the billing mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSelection {
    pub mode: BillingMode,
    /// Whether the service permits same-day time ranges in flexible mode.
    pub allow_range_booking: bool,
    pub start_date: Date,
    pub end_date: Date,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Overnight-stay add-on; only meaningful on multi-day ranges.
    pub overnight: bool,
}

/// One day of a multi-day booking: the attended day window, and when an
/// overnight stay is booked, the covered night through to the next morning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItineraryDay {
    pub date: Date,
    pub day_start: String,
    pub day_end: String,
    /// Present on every night except after the final day.
    pub overnight_until_next_day: bool,
}

impl RangeSelection {
    pub fn validate(&self) -> Result<(), SelectionError> {
        if self.end_date < self.start_date {
            return Err(SelectionError::InvalidDateRange(
                format_date(self.start_date),
                format_date(self.end_date),
            ));
        }

        match self.mode {
            BillingMode::Hourly => {
                if self.start_time.is_none() {
                    return Err(SelectionError::MissingStartTime);
                }
            }
            BillingMode::Daily => {}
            BillingMode::Flexible => {
                let same_day = self.start_date == self.end_date;
                if same_day && self.allow_range_booking {
                    let start = self
                        .start_time
                        .as_deref()
                        .ok_or(SelectionError::MissingStartTime)?;
                    let end = self
                        .end_time
                        .as_deref()
                        .ok_or(SelectionError::MissingEndTime)?;
                    if end <= start {
                        return Err(SelectionError::EndNotAfterStart {
                            start: start.to_string(),
                            end: end.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Distinct calendar days covered, inclusive.
    pub fn day_count(&self) -> i64 {
        days_between(self.start_date, self.end_date) + 1
    }

    /// The overnight checkbox only appears on multi-day ranges of announcers
    /// who allow overnight stays.
    pub fn can_offer_overnight(&self, announcer_allows_overnight: bool) -> bool {
        announcer_allows_overnight && self.day_count() >= 2
    }

    /// Nights covered when the overnight add-on is checked: days minus one.
    pub fn nights(&self) -> Option<i64> {
        (self.overnight && self.day_count() >= 2).then(|| self.day_count() - 1)
    }

    /// Day-by-day derivation of the booking from the announcer's day window.
    /// Purely presentational: nothing here is stored.
    pub fn itinerary(&self, day_start: &str, day_end: &str) -> Vec<ItineraryDay> {
        let Ok(dates) = inclusive_date_range(self.start_date, self.end_date) else {
            return Vec::new();
        };
        let last = dates.len().saturating_sub(1);

        dates
            .into_iter()
            .enumerate()
            .map(|(index, date)| ItineraryDay {
                date,
                day_start: day_start.to_string(),
                day_end: day_end.to_string(),
                overnight_until_next_day: self.overnight && index < last,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::calendar::parse_local_date;

    fn selection(mode: BillingMode, start: &str, end: &str) -> RangeSelection {
        RangeSelection {
            mode,
            allow_range_booking: true,
            start_date: parse_local_date(start).unwrap(),
            end_date: parse_local_date(end).unwrap(),
            start_time: None,
            end_time: None,
            overnight: false,
        }
    }

    #[test]
    fn candidates_respect_the_accept_window_inclusively() {
        let slots = candidate_time_slots("09:00", "14:00");
        assert_eq!(slots.first().map(String::as_str), Some("09:00"));
        assert_eq!(slots.last().map(String::as_str), Some("14:00"));
        assert!(!slots.iter().any(|t| t.as_str() < "09:00"));
        assert!(!slots.iter().any(|t| t.as_str() > "14:00"));
    }

    #[test]
    fn end_time_choices_are_strictly_after_start() {
        let candidates = candidate_time_slots("08:00", "20:00");
        let choices = end_time_choices(&candidates, "14:00");
        assert!(!choices.is_empty());
        assert!(choices.iter().all(|t| t.as_str() > "14:00"));
        assert!(!choices.contains(&"14:00".to_string()));
    }

    #[test]
    fn hourly_requires_a_start_time() {
        let mut sel = selection(BillingMode::Hourly, "2024-05-01", "2024-05-01");
        assert_eq!(sel.validate(), Err(SelectionError::MissingStartTime));
        sel.start_time = Some("10:00".into());
        assert_eq!(sel.validate(), Ok(()));
    }

    #[test]
    fn daily_ignores_times_but_checks_the_range() {
        let sel = selection(BillingMode::Daily, "2024-05-01", "2024-05-04");
        assert_eq!(sel.validate(), Ok(()));

        let inverted = selection(BillingMode::Daily, "2024-05-04", "2024-05-01");
        assert!(matches!(
            inverted.validate(),
            Err(SelectionError::InvalidDateRange(..))
        ));
    }

    #[test]
    fn same_day_flexible_range_needs_ordered_times() {
        let mut sel = selection(BillingMode::Flexible, "2024-05-01", "2024-05-01");
        sel.start_time = Some("14:00".into());
        assert_eq!(sel.validate(), Err(SelectionError::MissingEndTime));

        sel.end_time = Some("13:00".into());
        assert!(matches!(
            sel.validate(),
            Err(SelectionError::EndNotAfterStart { .. })
        ));

        sel.end_time = Some("16:30".into());
        assert_eq!(sel.validate(), Ok(()));
    }

    #[test]
    fn multi_day_flexible_range_needs_no_times() {
        let sel = selection(BillingMode::Flexible, "2024-05-01", "2024-05-03");
        assert_eq!(sel.validate(), Ok(()));
    }

    #[test]
    fn nights_are_days_minus_one() {
        let mut sel = selection(BillingMode::Daily, "2024-05-01", "2024-05-04");
        assert!(sel.can_offer_overnight(true));
        assert!(!sel.can_offer_overnight(false));
        assert_eq!(sel.nights(), None);

        sel.overnight = true;
        assert_eq!(sel.day_count(), 4);
        assert_eq!(sel.nights(), Some(3));
    }

    #[test]
    fn single_day_never_offers_overnight() {
        let mut sel = selection(BillingMode::Daily, "2024-05-01", "2024-05-01");
        assert!(!sel.can_offer_overnight(true));
        sel.overnight = true;
        assert_eq!(sel.nights(), None);
    }

    #[test]
    fn itinerary_covers_every_day_and_every_night_but_the_last() {
        let mut sel = selection(BillingMode::Daily, "2024-05-01", "2024-05-03");
        sel.overnight = true;

        let days = sel.itinerary("08:00", "19:00");
        assert_eq!(days.len(), 3);
        assert!(days.iter().all(|d| d.day_start == "08:00" && d.day_end == "19:00"));
        assert!(days[0].overnight_until_next_day);
        assert!(days[1].overnight_until_next_day);
        assert!(!days[2].overnight_until_next_day);
    }
}
