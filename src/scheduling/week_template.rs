use serde::Serialize;
use time::{Date, Duration};

use crate::db::AvailabilityRecord;
use crate::scheduling::calendar::{day_of_week, days_between, CalendarError, MAX_DUPLICATION_DAYS};

/// One reference week's availability, bucketed by weekday index
/// (0 = Sunday .. 6 = Saturday). Derived transiently for duplication,
/// never persisted.
#[derive(Debug, Default)]
pub struct WeekPattern {
    buckets: [Vec<AvailabilityRecord>; 7],
}

impl WeekPattern {
    pub fn from_records(records: Vec<AvailabilityRecord>) -> Self {
        let mut pattern = Self::default();
        for record in records {
            let weekday = day_of_week(record.date) as usize;
            pattern.buckets[weekday].push(record);
        }
        pattern
    }

    pub fn bucket(&self, weekday: u8) -> &[AvailabilityRecord] {
        &self.buckets[weekday as usize]
    }
}

/// What to do on one target date.
#[derive(Debug)]
pub enum DayAction<'a> {
    /// Source weekday had no availability: delete whatever the target date
    /// holds, so the template's absence propagates as strongly as presence.
    Clear,
    /// Upsert each template record into the target date, keyed by its
    /// category type.
    Apply(&'a [AvailabilityRecord]),
}

#[derive(Debug)]
pub struct DayPlan<'a> {
    pub date: Date,
    pub action: DayAction<'a>,
}

#[derive(Debug)]
pub struct DuplicationPlan<'a> {
    pub days: Vec<DayPlan<'a>>,
    /// Target dates considered after exclusions (past dates, source week).
    pub total_days: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct DuplicationSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub total_days: usize,
}

/// Expand a source week's pattern over `[target_start, target_end]`,
/// matching by day-of-week. Dates before `today` are never touched (no
/// retroactive writes) and the source week never overwrites itself.
pub fn plan_week_duplication<'a>(
    pattern: &'a WeekPattern,
    source_week_start: Date,
    target_start: Date,
    target_end: Date,
    today: Date,
    overwrite_existing: bool,
) -> Result<DuplicationPlan<'a>, CalendarError> {
    let span = days_between(target_start, target_end);
    if span > MAX_DUPLICATION_DAYS {
        return Err(CalendarError::RangeTooLarge {
            days: span,
            max: MAX_DUPLICATION_DAYS,
        });
    }

    let source_week_end = source_week_start + Duration::days(6);

    let mut days = Vec::new();
    let mut total_days = 0;
    let mut current = target_start;
    while current <= target_end {
        let date = current;
        current = match current.next_day() {
            Some(next) => next,
            None => break,
        };

        if date < today {
            continue;
        }
        if date >= source_week_start && date <= source_week_end {
            continue;
        }
        total_days += 1;

        let bucket = pattern.bucket(day_of_week(date));
        if bucket.is_empty() {
            if overwrite_existing {
                days.push(DayPlan {
                    date,
                    action: DayAction::Clear,
                });
            }
        } else {
            days.push(DayPlan {
                date,
                action: DayAction::Apply(bucket),
            });
        }
    }

    Ok(DuplicationPlan { days, total_days })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{AvailabilityStatus, TimeSlot};
    use crate::scheduling::calendar::parse_local_date;
    use sqlx::types::{Json, Uuid};
    use time::OffsetDateTime;

    fn d(s: &str) -> Date {
        parse_local_date(s).unwrap()
    }

    fn record(date: &str, status: AvailabilityStatus) -> AvailabilityRecord {
        AvailabilityRecord {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            date: d(date),
            category_type_id: Some(Uuid::new_v4()),
            status,
            time_slots: Some(Json(vec![TimeSlot {
                start_time: "09:00".into(),
                end_time: "17:00".into(),
            }])),
            reason: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn buckets_by_weekday() {
        // 2024-03-04 is a Monday, 2024-03-05 a Tuesday
        let pattern = WeekPattern::from_records(vec![
            record("2024-03-04", AvailabilityStatus::Available),
            record("2024-03-05", AvailabilityStatus::Partial),
        ]);
        assert_eq!(pattern.bucket(1).len(), 1);
        assert_eq!(pattern.bucket(2).len(), 1);
        assert!(pattern.bucket(0).is_empty());
    }

    #[test]
    fn absence_propagates_as_clear() {
        // Source week: Tuesday available, every other day absent.
        let pattern = WeekPattern::from_records(vec![record(
            "2024-03-05",
            AvailabilityStatus::Available,
        )]);

        let plan = plan_week_duplication(
            &pattern,
            d("2024-03-04"),
            d("2024-03-11"),
            d("2024-03-24"),
            d("2024-03-01"),
            true,
        )
        .unwrap();

        assert_eq!(plan.total_days, 14);
        // Target Mondays come out as Clear, target Tuesdays as Apply.
        let monday = plan.days.iter().find(|p| p.date == d("2024-03-11")).unwrap();
        assert!(matches!(monday.action, DayAction::Clear));
        let tuesday = plan.days.iter().find(|p| p.date == d("2024-03-12")).unwrap();
        assert!(matches!(tuesday.action, DayAction::Apply(records) if records.len() == 1));
    }

    #[test]
    fn without_overwrite_empty_buckets_do_nothing() {
        let pattern = WeekPattern::from_records(vec![record(
            "2024-03-05",
            AvailabilityStatus::Available,
        )]);

        let plan = plan_week_duplication(
            &pattern,
            d("2024-03-04"),
            d("2024-03-11"),
            d("2024-03-17"),
            d("2024-03-01"),
            false,
        )
        .unwrap();

        assert_eq!(plan.total_days, 7);
        // Only the Tuesday carries an action.
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].date, d("2024-03-12"));
    }

    #[test]
    fn past_dates_are_excluded() {
        let pattern = WeekPattern::from_records(vec![record(
            "2024-03-05",
            AvailabilityStatus::Available,
        )]);

        let plan = plan_week_duplication(
            &pattern,
            d("2024-03-04"),
            d("2024-03-11"),
            d("2024-03-17"),
            d("2024-03-14"),
            true,
        )
        .unwrap();

        assert_eq!(plan.total_days, 4);
        assert!(plan.days.iter().all(|p| p.date >= d("2024-03-14")));
    }

    #[test]
    fn source_week_never_overwrites_itself() {
        let pattern = WeekPattern::from_records(vec![record(
            "2024-03-05",
            AvailabilityStatus::Available,
        )]);

        // Target range covers the source week entirely.
        let plan = plan_week_duplication(
            &pattern,
            d("2024-03-04"),
            d("2024-03-04"),
            d("2024-03-17"),
            d("2024-03-01"),
            true,
        )
        .unwrap();

        assert_eq!(plan.total_days, 7);
        assert!(plan.days.iter().all(|p| p.date > d("2024-03-10")));
    }

    #[test]
    fn oversized_target_range_is_rejected() {
        let pattern = WeekPattern::default();
        let result = plan_week_duplication(
            &pattern,
            d("2024-03-04"),
            d("2024-03-11"),
            d("2025-06-01"),
            d("2024-03-01"),
            true,
        );
        assert!(matches!(result, Err(CalendarError::RangeTooLarge { .. })));
    }
}
