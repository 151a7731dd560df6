use sqlx::types::Uuid;
use sqlx::PgPool;
use time::{Date, Duration, OffsetDateTime};
use tracing::info;

use crate::db::{
    AvailabilityRecord, AvailabilityRepository, AvailabilityStatus, CatalogRepository, TimeSlot,
    WeekDayAvailability,
};
use crate::error::{AppError, AppResult};
use crate::scheduling::calendar::{day_of_week, format_date, inclusive_date_range, parse_local_date};
use crate::scheduling::conflict::{check_collective_conflict, parse_windows, ConflictReport};
use crate::scheduling::week_template::{
    plan_week_duplication, DayAction, DuplicationSummary, WeekPattern,
};

/// The availability mutation and read API. Every operation acts on behalf of
/// an already-authenticated owner; handlers resolve the session first.
///
/// Mutations run their validation and conflict checks before any write, so a
/// failed call leaves the calendar untouched. The conflict check reads live
/// collective-slot state on each call; a slot created concurrently between
/// check and write wins by last-write (no optimistic token).
pub struct AvailabilityService;

impl AvailabilityService {
    pub async fn get_by_date_range(
        pool: &PgPool,
        owner_id: Uuid,
        start: Date,
        end: Date,
    ) -> AppResult<Vec<AvailabilityRecord>> {
        Ok(AvailabilityRepository::find_by_date_range(pool, owner_id, start, end).await?)
    }

    /// Single-key read. Absence is authoritative "unavailable"; callers must
    /// treat `None` as closed, never as open. Without a category type the
    /// first record on the date is returned (legacy compatibility).
    pub async fn get_by_date(
        pool: &PgPool,
        owner_id: Uuid,
        date: Date,
        category_type_id: Option<Uuid>,
    ) -> AppResult<Option<AvailabilityRecord>> {
        match category_type_id {
            Some(_) => {
                Ok(AvailabilityRepository::find_by_key(pool, owner_id, date, category_type_id)
                    .await?)
            }
            None => Ok(AvailabilityRepository::find_by_date(pool, owner_id, date)
                .await?
                .into_iter()
                .next()),
        }
    }

    pub async fn get_week(
        pool: &PgPool,
        owner_id: Uuid,
        week_start: Date,
    ) -> AppResult<Vec<WeekDayAvailability>> {
        let week_end = week_start + Duration::days(6);
        let records =
            AvailabilityRepository::find_by_date_range(pool, owner_id, week_start, week_end)
                .await?;
        Ok(records
            .into_iter()
            .map(|record| WeekDayAvailability {
                day_of_week: day_of_week(record.date),
                record,
            })
            .collect())
    }

    /// Upsert one (date, category type) key. `available`/`partial` must pass
    /// the collective-slot conflict check first; on conflict nothing is
    /// written.
    pub async fn set_availability(
        pool: &PgPool,
        owner_id: Uuid,
        date: Date,
        category_type_id: Uuid,
        status: AvailabilityStatus,
        time_slots: Option<Vec<TimeSlot>>,
        reason: Option<String>,
    ) -> AppResult<AvailabilityRecord> {
        Self::ensure_category_type(pool, category_type_id).await?;
        if let Some(slots) = &time_slots {
            parse_windows(slots)?;
        }

        if opens_bookings(status) {
            let report = check_collective_conflict(
                pool,
                owner_id,
                category_type_id,
                date,
                time_slots.as_deref(),
            )
            .await?;
            if report.has_conflict() {
                return Err(conflict_error(report));
            }
        }

        let record = Self::upsert(
            pool,
            owner_id,
            date,
            Some(category_type_id),
            status,
            time_slots.as_deref(),
            reason.as_deref(),
        )
        .await?;

        info!(owner = %owner_id, date = %format_date(date), ?status, "availability set");
        Ok(record)
    }

    /// Range upsert: the conflict pre-pass covers every date in the range
    /// before the first write, so a conflict anywhere fails the whole call
    /// with no partial state.
    #[allow(clippy::too_many_arguments)]
    pub async fn set_availability_range(
        pool: &PgPool,
        owner_id: Uuid,
        start: Date,
        end: Date,
        category_type_id: Uuid,
        status: AvailabilityStatus,
        time_slots: Option<Vec<TimeSlot>>,
        reason: Option<String>,
    ) -> AppResult<usize> {
        let dates = inclusive_date_range(start, end)?;
        if dates.is_empty() {
            return Err(AppError::InvalidRange(format!(
                "start date {} is after end date {}",
                format_date(start),
                format_date(end)
            )));
        }

        Self::ensure_category_type(pool, category_type_id).await?;
        if let Some(slots) = &time_slots {
            parse_windows(slots)?;
        }

        if opens_bookings(status) {
            let mut conflicting_slots = Vec::new();
            for date in &dates {
                let report = check_collective_conflict(
                    pool,
                    owner_id,
                    category_type_id,
                    *date,
                    time_slots.as_deref(),
                )
                .await?;
                conflicting_slots.extend(report.conflicting_slots);
            }
            if !conflicting_slots.is_empty() {
                return Err(conflict_error(ConflictReport { conflicting_slots }));
            }
        }

        for date in &dates {
            Self::upsert(
                pool,
                owner_id,
                *date,
                Some(category_type_id),
                status,
                time_slots.as_deref(),
                reason.as_deref(),
            )
            .await?;
        }

        info!(
            owner = %owner_id,
            start = %format_date(start),
            end = %format_date(end),
            dates = dates.len(),
            "availability range set"
        );
        Ok(dates.len())
    }

    /// Delete the record(s) for a date; omitting the category type clears
    /// every record on the date (compatibility mode for pre-categorized
    /// data). The key returns to its implicit-unavailable default.
    pub async fn clear_availability(
        pool: &PgPool,
        owner_id: Uuid,
        date: Date,
        category_type_id: Option<Uuid>,
    ) -> AppResult<u64> {
        let mut tx = pool.begin().await?;
        let deleted =
            AvailabilityRepository::delete_by_key(&mut tx, owner_id, date, category_type_id)
                .await?;
        tx.commit().await?;
        Ok(deleted)
    }

    /// Delete one record by id, verifying ownership.
    pub async fn clear_availability_record(
        pool: &PgPool,
        owner_id: Uuid,
        record_id: Uuid,
    ) -> AppResult<()> {
        let record = AvailabilityRepository::find_by_id(pool, record_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("availability record {record_id}")))?;
        if record.owner_id != owner_id {
            return Err(AppError::Ownership(format!(
                "availability record {record_id} belongs to another user"
            )));
        }

        let mut tx = pool.begin().await?;
        AvailabilityRepository::delete_by_id(&mut tx, record_id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn clear_availability_range(
        pool: &PgPool,
        owner_id: Uuid,
        start: Date,
        end: Date,
        category_type_id: Option<Uuid>,
    ) -> AppResult<u64> {
        if end < start {
            return Err(AppError::InvalidRange(format!(
                "start date {} is after end date {}",
                format_date(start),
                format_date(end)
            )));
        }

        let mut tx = pool.begin().await?;
        let deleted =
            AvailabilityRepository::delete_range(&mut tx, owner_id, start, end, category_type_id)
                .await?;
        tx.commit().await?;

        info!(owner = %owner_id, deleted, "availability range cleared");
        Ok(deleted)
    }

    /// Single-button primitive. Absent or explicitly-unavailable keys become
    /// `available` (after the conflict check); open keys are deleted back to
    /// the implicit default.
    pub async fn toggle_availability(
        pool: &PgPool,
        owner_id: Uuid,
        date: Date,
        category_type_id: Uuid,
    ) -> AppResult<AvailabilityStatus> {
        let existing =
            AvailabilityRepository::find_by_key(pool, owner_id, date, Some(category_type_id))
                .await?;

        match existing {
            Some(record) if opens_bookings(record.status) => {
                let mut tx = pool.begin().await?;
                AvailabilityRepository::delete_by_id(&mut tx, record.id).await?;
                tx.commit().await?;
                Ok(AvailabilityStatus::Unavailable)
            }
            existing => {
                // A toggle opens the whole day, so any active slot conflicts.
                let report =
                    check_collective_conflict(pool, owner_id, category_type_id, date, None).await?;
                if report.has_conflict() {
                    return Err(conflict_error(report));
                }

                let mut tx = pool.begin().await?;
                match existing {
                    Some(record) => {
                        AvailabilityRepository::update(
                            &mut tx,
                            record.id,
                            AvailabilityStatus::Available,
                            None,
                            None,
                        )
                        .await?;
                    }
                    None => {
                        AvailabilityRepository::insert(
                            &mut tx,
                            owner_id,
                            date,
                            Some(category_type_id),
                            AvailabilityStatus::Available,
                            None,
                            None,
                        )
                        .await?;
                    }
                }
                tx.commit().await?;
                Ok(AvailabilityStatus::Available)
            }
        }
    }

    /// Close every Saturday and Sunday of a month. With a category type the
    /// default-closed invariant already covers absent keys, so any open
    /// weekend record is deleted rather than patched. The legacy path (no
    /// category type) writes explicit unavailable rows with reason
    /// "Weekend".
    pub async fn set_weekends_unavailable(
        pool: &PgPool,
        owner_id: Uuid,
        month: u8,
        year: i32,
        category_type_id: Option<Uuid>,
    ) -> AppResult<u64> {
        let weekends = weekend_days_in_month(year, month)
            .map_err(|_| AppError::Validation(format!("invalid month {year}-{month:02}")))?;

        match category_type_id {
            Some(category_type_id) => {
                let mut tx = pool.begin().await?;
                let deleted = AvailabilityRepository::delete_open_records_on_dates(
                    &mut tx,
                    owner_id,
                    &weekends,
                    category_type_id,
                )
                .await?;
                tx.commit().await?;

                info!(owner = %owner_id, year, month, deleted, "weekend availability cleared");
                Ok(deleted)
            }
            None => {
                let mut written = 0;
                for date in weekends {
                    Self::upsert(
                        pool,
                        owner_id,
                        date,
                        None,
                        AvailabilityStatus::Unavailable,
                        None,
                        Some("Weekend"),
                    )
                    .await?;
                    written += 1;
                }

                info!(owner = %owner_id, year, month, written, "weekends marked unavailable");
                Ok(written)
            }
        }
    }

    /// Copy one source week's per-day pattern across the target range,
    /// matching by day-of-week. Source absence deletes target records, so a
    /// week template is a complete weekly pattern, not an additive overlay.
    pub async fn duplicate_week(
        pool: &PgPool,
        owner_id: Uuid,
        source_week_start: Date,
        target_start: Date,
        target_end: Date,
        overwrite_existing: bool,
    ) -> AppResult<DuplicationSummary> {
        let source_week_end = source_week_start + Duration::days(6);
        let source_records = AvailabilityRepository::find_by_date_range(
            pool,
            owner_id,
            source_week_start,
            source_week_end,
        )
        .await?;
        let pattern = WeekPattern::from_records(source_records);

        let today = OffsetDateTime::now_utc().date();
        let plan = plan_week_duplication(
            &pattern,
            source_week_start,
            target_start,
            target_end,
            today,
            overwrite_existing,
        )?;

        let mut summary = DuplicationSummary {
            total_days: plan.total_days,
            ..Default::default()
        };

        for day in &plan.days {
            match day.action {
                DayAction::Clear => {
                    let mut tx = pool.begin().await?;
                    AvailabilityRepository::delete_by_key(&mut tx, owner_id, day.date, None)
                        .await?;
                    tx.commit().await?;
                }
                DayAction::Apply(templates) => {
                    for template in templates {
                        let existing = AvailabilityRepository::find_by_key(
                            pool,
                            owner_id,
                            day.date,
                            template.category_type_id,
                        )
                        .await?;

                        let time_slots = template.time_slots.as_ref().map(|s| s.0.as_slice());
                        let mut tx = pool.begin().await?;
                        match existing {
                            None => {
                                AvailabilityRepository::insert(
                                    &mut tx,
                                    owner_id,
                                    day.date,
                                    template.category_type_id,
                                    template.status,
                                    time_slots,
                                    template.reason.as_deref(),
                                )
                                .await?;
                                summary.created += 1;
                            }
                            Some(record) if overwrite_existing => {
                                AvailabilityRepository::update(
                                    &mut tx,
                                    record.id,
                                    template.status,
                                    time_slots,
                                    template.reason.as_deref(),
                                )
                                .await?;
                                summary.updated += 1;
                            }
                            Some(_) => {
                                summary.skipped += 1;
                            }
                        }
                        tx.commit().await?;
                    }
                }
            }
        }

        info!(
            owner = %owner_id,
            source = %format_date(source_week_start),
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            "week availability duplicated"
        );
        Ok(summary)
    }

    async fn ensure_category_type(pool: &PgPool, category_type_id: Uuid) -> AppResult<()> {
        CatalogRepository::find_category_type(pool, category_type_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category type {category_type_id}")))?;
        Ok(())
    }

    async fn upsert(
        pool: &PgPool,
        owner_id: Uuid,
        date: Date,
        category_type_id: Option<Uuid>,
        status: AvailabilityStatus,
        time_slots: Option<&[TimeSlot]>,
        reason: Option<&str>,
    ) -> AppResult<AvailabilityRecord> {
        let existing =
            AvailabilityRepository::find_by_key(pool, owner_id, date, category_type_id).await?;

        let mut tx = pool.begin().await?;
        let record = match existing {
            Some(record) => {
                AvailabilityRepository::update(&mut tx, record.id, status, time_slots, reason)
                    .await?
            }
            None => {
                AvailabilityRepository::insert(
                    &mut tx,
                    owner_id,
                    date,
                    category_type_id,
                    status,
                    time_slots,
                    reason,
                )
                .await?
            }
        };
        tx.commit().await?;
        Ok(record)
    }
}

/// Whether a status accepts individual bookings and therefore needs the
/// collective-slot guard.
fn opens_bookings(status: AvailabilityStatus) -> bool {
    matches!(
        status,
        AvailabilityStatus::Available | AvailabilityStatus::Partial
    )
}

fn conflict_error(report: ConflictReport) -> AppError {
    AppError::CollectiveSlotConflict {
        conflicts: report.conflicting_slots.iter().map(Into::into).collect(),
    }
}

/// Every Saturday and Sunday of the given month, ascending.
fn weekend_days_in_month(year: i32, month: u8) -> Result<Vec<Date>, crate::scheduling::calendar::CalendarError> {
    let first = parse_local_date(&format!("{year:04}-{month:02}-01"))?;
    let mut weekends = Vec::new();
    let mut current = first;
    while u8::from(current.month()) == month && current.year() == year {
        let weekday = day_of_week(current);
        if weekday == 0 || weekday == 6 {
            weekends.push(current);
        }
        current = match current.next_day() {
            Some(next) => next,
            None => break,
        };
    }
    Ok(weekends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::calendar::format_date;

    #[test]
    fn weekend_enumeration_for_february_2024() {
        let weekends = weekend_days_in_month(2024, 2).unwrap();
        let formatted: Vec<String> = weekends.iter().copied().map(format_date).collect();
        assert_eq!(
            formatted,
            vec![
                "2024-02-03",
                "2024-02-04",
                "2024-02-10",
                "2024-02-11",
                "2024-02-17",
                "2024-02-18",
                "2024-02-24",
                "2024-02-25",
            ]
        );
    }

    #[test]
    fn weekend_enumeration_rejects_bad_month() {
        assert!(weekend_days_in_month(2024, 13).is_err());
    }

    #[test]
    fn open_statuses_need_the_conflict_guard() {
        assert!(opens_bookings(AvailabilityStatus::Available));
        assert!(opens_bookings(AvailabilityStatus::Partial));
        assert!(!opens_bookings(AvailabilityStatus::Unavailable));
    }
}
