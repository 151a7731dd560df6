use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime, Time};

/// A scheduled group session with fixed capacity, owned by one of the
/// announcer's services. Managed by the group-session subsystem; consumed
/// read-only here for conflict checks and client slot listings.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CollectiveSlot {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub service_id: Uuid,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub available_spots: i32,
    pub max_animals: i32,
    pub is_active: bool,
    pub is_cancelled: bool,
    pub created_at: OffsetDateTime,
}
