use serde::{Deserialize, Serialize};
use sqlx::types::{Json, Uuid};
use time::{Date, OffsetDateTime};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "availability_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    Partial,
    Unavailable,
}

/// A single bookable window within a day, 24h "HH:MM" strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: String,
    pub end_time: String,
}

/// Per-(owner, date, category type) availability declaration.
///
/// Absence of a row is the authoritative "unavailable" state; a row only
/// exists to express `available`/`partial`, or to annotate an explicit
/// `unavailable` with a reason. `category_type_id` is NULL only on rows
/// written before availability was partitioned by category type.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub date: Date,
    pub category_type_id: Option<Uuid>,
    pub status: AvailabilityStatus,
    pub time_slots: Option<Json<Vec<TimeSlot>>>,
    pub reason: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetAvailabilityPayload {
    #[validate(length(min = 10, max = 10))]
    pub date: String,
    pub category_type_id: Uuid,
    pub status: AvailabilityStatus,
    pub time_slots: Option<Vec<TimeSlot>>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetAvailabilityRangePayload {
    #[validate(length(min = 10, max = 10))]
    pub start_date: String,
    #[validate(length(min = 10, max = 10))]
    pub end_date: String,
    pub category_type_id: Uuid,
    pub status: AvailabilityStatus,
    pub time_slots: Option<Vec<TimeSlot>>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ToggleAvailabilityPayload {
    #[validate(length(min = 10, max = 10))]
    pub date: String,
    pub category_type_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WeekendsUnavailablePayload {
    #[validate(range(min = 1, max = 12))]
    pub month: u8,
    #[validate(range(min = 2020, max = 2100))]
    pub year: i32,
    pub category_type_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DuplicateWeekPayload {
    #[validate(length(min = 10, max = 10))]
    pub source_week_start: String,
    #[validate(length(min = 10, max = 10))]
    pub target_start: String,
    #[validate(length(min = 10, max = 10))]
    pub target_end: String,
    pub overwrite_existing: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SetAvailabilityResult {
    pub success: bool,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct RangeUpdateResult {
    pub success: bool,
    pub dates_updated: usize,
}

#[derive(Debug, Serialize)]
pub struct ClearResult {
    pub success: bool,
    pub deleted: u64,
}

#[derive(Debug, Serialize)]
pub struct BulkResult {
    pub success: bool,
    pub affected: u64,
}

#[derive(Debug, Serialize)]
pub struct ToggleResult {
    /// Logical status after the toggle; `unavailable` means the row was
    /// deleted and the key is back to its implicit default.
    pub status: AvailabilityStatus,
}

/// Week read annotated with the weekday index (0 = Sunday .. 6 = Saturday).
#[derive(Debug, Serialize)]
pub struct WeekDayAvailability {
    pub day_of_week: u8,
    #[serde(flatten)]
    pub record: AvailabilityRecord,
}
