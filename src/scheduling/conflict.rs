use sqlx::types::Uuid;
use sqlx::PgPool;
use time::{Date, Time};

use crate::db::{CatalogRepository, CollectiveSlot, CollectiveSlotRepository, TimeSlot};
use crate::error::{AppError, AppResult};
use crate::scheduling::calendar::parse_local_time;

/// Result of checking a candidate availability change against the owner's
/// scheduled group sessions.
#[derive(Debug, Default)]
pub struct ConflictReport {
    pub conflicting_slots: Vec<CollectiveSlot>,
}

impl ConflictReport {
    pub fn has_conflict(&self) -> bool {
        !self.conflicting_slots.is_empty()
    }
}

/// Strict interval overlap on half-open [start, end) windows. Touching
/// intervals (one ends exactly when the other starts) do not overlap.
pub fn windows_overlap(a_start: Time, a_end: Time, b_start: Time, b_end: Time) -> bool {
    a_start < b_end && a_end > b_start
}

/// Whether a slot occupying [slot_start, slot_end) conflicts with the
/// requested windows. An empty window list is a whole-day availability
/// request, which implicitly covers every hour, so any slot conflicts.
pub fn slot_conflicts(slot_start: Time, slot_end: Time, windows: &[(Time, Time)]) -> bool {
    if windows.is_empty() {
        return true;
    }
    windows
        .iter()
        .any(|&(start, end)| windows_overlap(slot_start, slot_end, start, end))
}

/// Parse and validate "HH:MM" time slots into concrete windows, preserving
/// order. Inverted or malformed slots are rejected before any check runs.
pub fn parse_windows(slots: &[TimeSlot]) -> AppResult<Vec<(Time, Time)>> {
    let mut windows = Vec::with_capacity(slots.len());
    for slot in slots {
        let start = parse_local_time(&slot.start_time)?;
        let end = parse_local_time(&slot.end_time)?;
        if end <= start {
            return Err(AppError::Validation(format!(
                "Time slot {} - {} ends before it starts",
                slot.start_time, slot.end_time
            )));
        }
        windows.push((start, end));
    }
    Ok(windows)
}

/// Check a candidate (owner, category type, date) availability change against
/// the owner's active collective slots for services of that category type.
///
/// Queried live on every mutating call; staleness here means double-booking,
/// so this is a synchronous dependency inside the mutation, not a cache.
pub async fn check_collective_conflict(
    pool: &PgPool,
    owner_id: Uuid,
    category_type_id: Uuid,
    date: Date,
    time_slots: Option<&[TimeSlot]>,
) -> AppResult<ConflictReport> {
    let service_ids =
        CatalogRepository::service_ids_for_category_type(pool, owner_id, category_type_id).await?;
    if service_ids.is_empty() {
        return Ok(ConflictReport::default());
    }

    let slots =
        CollectiveSlotRepository::active_slots_on_date(pool, owner_id, date, &service_ids).await?;
    if slots.is_empty() {
        return Ok(ConflictReport::default());
    }

    let windows = match time_slots {
        Some(slots) => parse_windows(slots)?,
        None => Vec::new(),
    };

    let conflicting_slots = slots
        .into_iter()
        .filter(|slot| slot_conflicts(slot.start_time, slot.end_time, &windows))
        .collect();

    Ok(ConflictReport { conflicting_slots })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Time {
        parse_local_time(s).unwrap()
    }

    #[test]
    fn overlap_is_strict() {
        assert!(windows_overlap(t("10:00"), t("12:00"), t("11:00"), t("13:00")));
        assert!(windows_overlap(t("11:00"), t("13:00"), t("10:00"), t("12:00")));
        // Touching intervals do not overlap
        assert!(!windows_overlap(t("10:00"), t("12:00"), t("12:00"), t("14:00")));
        assert!(!windows_overlap(t("12:00"), t("14:00"), t("10:00"), t("12:00")));
        // Containment overlaps
        assert!(windows_overlap(t("09:00"), t("17:00"), t("10:00"), t("11:00")));
    }

    #[test]
    fn whole_day_request_conflicts_with_any_slot() {
        assert!(slot_conflicts(t("10:00"), t("12:00"), &[]));
    }

    #[test]
    fn disjoint_window_does_not_conflict() {
        let windows = vec![(t("13:00"), t("14:00"))];
        assert!(!slot_conflicts(t("10:00"), t("12:00"), &windows));
    }

    #[test]
    fn any_overlapping_window_conflicts() {
        let windows = vec![(t("08:00"), t("09:00")), (t("11:30"), t("15:00"))];
        assert!(slot_conflicts(t("10:00"), t("12:00"), &windows));
    }

    #[test]
    fn parse_windows_rejects_inverted_slots() {
        let slots = vec![TimeSlot {
            start_time: "14:00".into(),
            end_time: "13:00".into(),
        }];
        assert!(parse_windows(&slots).is_err());
    }

    #[test]
    fn parse_windows_keeps_order() {
        let slots = vec![
            TimeSlot {
                start_time: "09:00".into(),
                end_time: "11:00".into(),
            },
            TimeSlot {
                start_time: "14:00".into(),
                end_time: "16:30".into(),
            },
        ];
        let windows = parse_windows(&slots).unwrap();
        assert_eq!(windows, vec![(t("09:00"), t("11:00")), (t("14:00"), t("16:30"))]);
    }
}
