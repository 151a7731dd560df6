use sqlx::types::Uuid;
use sqlx::PgPool;
use time::Date;

use crate::db::models::CollectiveSlot;

const SLOT_COLUMNS: &str = "id, owner_id, service_id, date, start_time, end_time, \
     available_spots, max_animals, is_active, is_cancelled, created_at";

/// Read-only access to the group-session subsystem's slots. This service
/// never writes them; it queries live state on every conflict check.
pub struct CollectiveSlotRepository;

impl CollectiveSlotRepository {
    /// Active, non-cancelled slots the owner holds on `date` for any of the
    /// given services.
    pub async fn active_slots_on_date(
        pool: &PgPool,
        owner_id: Uuid,
        date: Date,
        service_ids: &[Uuid],
    ) -> Result<Vec<CollectiveSlot>, sqlx::Error> {
        if service_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, CollectiveSlot>(&format!(
            r#"
            SELECT {SLOT_COLUMNS}
            FROM collective_slots
            WHERE owner_id = $1 AND date = $2 AND service_id = ANY($3)
              AND is_active AND NOT is_cancelled
            ORDER BY start_time
            "#
        ))
        .bind(owner_id)
        .bind(date)
        .bind(service_ids)
        .fetch_all(pool)
        .await
    }

    /// Slots a client may book against: active, not cancelled, not in the
    /// past, with enough free spots for the party and a service compatible
    /// with the animal type. Eligibility is decided here; the picker only
    /// renders and selects.
    pub async fn available_slots(
        pool: &PgPool,
        service_id: Uuid,
        animal_count: i32,
        animal_type: &str,
        from_date: Date,
    ) -> Result<Vec<CollectiveSlot>, sqlx::Error> {
        sqlx::query_as::<_, CollectiveSlot>(
            r#"
            SELECT cs.id, cs.owner_id, cs.service_id, cs.date, cs.start_time, cs.end_time,
                   cs.available_spots, cs.max_animals, cs.is_active, cs.is_cancelled, cs.created_at
            FROM collective_slots cs
            JOIN services s ON s.id = cs.service_id
            WHERE cs.service_id = $1 AND cs.date >= $2
              AND cs.is_active AND NOT cs.is_cancelled
              AND cs.available_spots >= $3
              AND cs.max_animals >= $3
              AND s.is_active
              AND $4 = ANY(s.animal_types)
            ORDER BY cs.date, cs.start_time
            "#,
        )
        .bind(service_id)
        .bind(from_date)
        .bind(animal_count)
        .bind(animal_type)
        .fetch_all(pool)
        .await
    }
}
