use std::collections::BTreeMap;

use time::{Date, Duration, Time};
use uuid::Uuid;

use crate::db::CollectiveSlot;

/// The slice of a collective slot the picker needs to render and select.
#[derive(Debug, Clone)]
pub struct PickerSlot {
    pub id: Uuid,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub available_spots: i32,
}

impl From<&CollectiveSlot> for PickerSlot {
    fn from(slot: &CollectiveSlot) -> Self {
        Self {
            id: slot.id,
            date: slot.date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            available_spots: slot.available_spots,
        }
    }
}

/// Client-side selection state for booking a fixed number of group sessions
/// with a minimum day-interval between them.
///
/// The interval check here is an optimistic client-side duplicate of the
/// server's authoritative conflict checks; it exists so selection feedback
/// never needs a network round-trip. Eligibility (capacity, animal type) is
/// decided server-side before slots reach the picker.
#[derive(Debug)]
pub struct SlotPicker {
    slots: Vec<PickerSlot>,
    number_of_sessions: usize,
    session_interval_days: i64,
    selected: Vec<Uuid>,
}

impl SlotPicker {
    pub fn new(
        slots: Vec<PickerSlot>,
        number_of_sessions: usize,
        session_interval_days: i64,
    ) -> Self {
        Self {
            slots,
            number_of_sessions,
            session_interval_days,
            selected: Vec::new(),
        }
    }

    /// False when the booking cannot be completed because fewer slots are on
    /// offer than sessions required. A warning state, not a hard failure:
    /// the picker keeps operating.
    pub fn has_enough_slots(&self) -> bool {
        self.slots.len() >= self.number_of_sessions
    }

    /// Selected slot ids in selection order, not date order.
    pub fn selection(&self) -> &[Uuid] {
        &self.selected
    }

    pub fn is_complete(&self) -> bool {
        self.selected.len() == self.number_of_sessions
    }

    /// A slot can be tapped when it is already selected (deselection), or
    /// when the selection is not full and its date keeps the minimum
    /// interval to every already-selected date.
    pub fn is_selectable(&self, id: Uuid) -> bool {
        if self.selected.contains(&id) {
            return true;
        }
        let Some(slot) = self.slot(id) else {
            return false;
        };
        self.selected.len() < self.number_of_sessions && self.respects_interval(slot.date)
    }

    /// Select or deselect a slot. Returns the post-change selection so the
    /// host can react to every change; an unselectable tap leaves the
    /// selection untouched.
    pub fn toggle(&mut self, id: Uuid) -> &[Uuid] {
        if let Some(position) = self.selected.iter().position(|s| *s == id) {
            self.selected.remove(position);
        } else if self.is_selectable(id) {
            self.selected.push(id);
        }
        &self.selected
    }

    fn slot(&self, id: Uuid) -> Option<&PickerSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    fn respects_interval(&self, date: Date) -> bool {
        self.selected
            .iter()
            .filter_map(|id| self.slot(*id))
            .all(|slot| (date - slot.date).whole_days().abs() >= self.session_interval_days)
    }

    /// Day view: slots grouped per calendar day.
    pub fn by_day(&self) -> BTreeMap<Date, Vec<&PickerSlot>> {
        let mut days: BTreeMap<Date, Vec<&PickerSlot>> = BTreeMap::new();
        for slot in &self.slots {
            days.entry(slot.date).or_default().push(slot);
        }
        days
    }

    /// Week view: grouped by the Monday starting each week.
    pub fn by_week(&self) -> BTreeMap<Date, Vec<&PickerSlot>> {
        let mut weeks: BTreeMap<Date, Vec<&PickerSlot>> = BTreeMap::new();
        for slot in &self.slots {
            weeks.entry(week_start(slot.date)).or_default().push(slot);
        }
        weeks
    }

    /// Month view: grouped by (year, month).
    pub fn by_month(&self) -> BTreeMap<(i32, u8), Vec<&PickerSlot>> {
        let mut months: BTreeMap<(i32, u8), Vec<&PickerSlot>> = BTreeMap::new();
        for slot in &self.slots {
            months
                .entry((slot.date.year(), u8::from(slot.date.month())))
                .or_default()
                .push(slot);
        }
        months
    }
}

fn week_start(date: Date) -> Date {
    date - Duration::days(i64::from(date.weekday().number_days_from_monday()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    fn slot(id: u128, year: i32, month: u8, day: u8) -> PickerSlot {
        PickerSlot {
            id: Uuid::from_u128(id),
            date: Date::from_calendar_date(year, Month::try_from(month).unwrap(), day).unwrap(),
            start_time: Time::from_hms(10, 0, 0).unwrap(),
            end_time: Time::from_hms(11, 0, 0).unwrap(),
            available_spots: 4,
        }
    }

    fn picker() -> SlotPicker {
        SlotPicker::new(
            vec![
                slot(1, 2024, 5, 1),
                slot(2, 2024, 5, 5),
                slot(3, 2024, 5, 8),
                slot(4, 2024, 5, 15),
            ],
            3,
            7,
        )
    }

    #[test]
    fn enforces_minimum_interval() {
        let mut picker = picker();
        picker.toggle(Uuid::from_u128(1));

        // Day 5 is only 4 days out: rejected.
        assert!(!picker.is_selectable(Uuid::from_u128(2)));
        assert_eq!(picker.toggle(Uuid::from_u128(2)).len(), 1);

        // Day 8 is exactly 7 days out: accepted.
        assert!(picker.is_selectable(Uuid::from_u128(3)));
        assert_eq!(picker.toggle(Uuid::from_u128(3)).len(), 2);
    }

    #[test]
    fn interval_applies_against_every_selected_date() {
        let mut picker = SlotPicker::new(
            vec![slot(1, 2024, 5, 1), slot(2, 2024, 5, 15), slot(3, 2024, 5, 10)],
            3,
            7,
        );
        picker.toggle(Uuid::from_u128(1));
        picker.toggle(Uuid::from_u128(2));
        // Day 10 is 9 days from day 1 but only 5 from day 15.
        assert!(!picker.is_selectable(Uuid::from_u128(3)));
    }

    #[test]
    fn full_selection_still_allows_deselection() {
        let mut picker = SlotPicker::new(
            vec![slot(1, 2024, 5, 1), slot(2, 2024, 5, 8), slot(3, 2024, 5, 15)],
            2,
            7,
        );
        picker.toggle(Uuid::from_u128(1));
        picker.toggle(Uuid::from_u128(2));
        assert!(picker.is_complete());

        assert!(!picker.is_selectable(Uuid::from_u128(3)));
        assert!(picker.is_selectable(Uuid::from_u128(1)));
        assert_eq!(picker.toggle(Uuid::from_u128(1)).len(), 1);
        assert!(!picker.is_complete());
    }

    #[test]
    fn selection_order_is_preserved() {
        let mut picker = picker();
        picker.toggle(Uuid::from_u128(3));
        picker.toggle(Uuid::from_u128(4));
        assert_eq!(
            picker.selection(),
            &[Uuid::from_u128(3), Uuid::from_u128(4)]
        );
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut picker = picker();
        assert!(!picker.is_selectable(Uuid::from_u128(99)));
        assert!(picker.toggle(Uuid::from_u128(99)).is_empty());
    }

    #[test]
    fn warns_when_offer_is_too_small() {
        let picker = SlotPicker::new(vec![slot(1, 2024, 5, 1)], 3, 7);
        assert!(!picker.has_enough_slots());
        // Still operable
        assert!(picker.is_selectable(Uuid::from_u128(1)));
    }

    #[test]
    fn views_group_the_same_slots() {
        let picker = picker();
        assert_eq!(picker.by_day().len(), 4);
        // May 1 (Wed) and May 5 (Sun) 2024 share the week of Mon Apr 29;
        // May 8 and May 15 start two further weeks.
        assert_eq!(picker.by_week().len(), 3);
        assert_eq!(picker.by_month().len(), 1);
        let total: usize = picker.by_month().values().map(|v| v.len()).sum();
        assert_eq!(total, 4);
    }
}
