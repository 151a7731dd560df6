use sqlx::types::{Json, Uuid};
use sqlx::{PgPool, Postgres, Transaction};
use time::Date;

use crate::db::models::{AvailabilityRecord, AvailabilityStatus, TimeSlot};

const RECORD_COLUMNS: &str =
    "id, owner_id, date, category_type_id, status, time_slots, reason, created_at, updated_at";

pub struct AvailabilityRepository;

impl AvailabilityRepository {
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<AvailabilityRecord>, sqlx::Error> {
        sqlx::query_as::<_, AvailabilityRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM availability WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lookup by the composite key. A `None` category type matches only
    /// legacy rows with a NULL category type, not any row on the date.
    pub async fn find_by_key(
        pool: &PgPool,
        owner_id: Uuid,
        date: Date,
        category_type_id: Option<Uuid>,
    ) -> Result<Option<AvailabilityRecord>, sqlx::Error> {
        sqlx::query_as::<_, AvailabilityRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM availability
            WHERE owner_id = $1 AND date = $2 AND category_type_id IS NOT DISTINCT FROM $3
            "#
        ))
        .bind(owner_id)
        .bind(date)
        .bind(category_type_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_date(
        pool: &PgPool,
        owner_id: Uuid,
        date: Date,
    ) -> Result<Vec<AvailabilityRecord>, sqlx::Error> {
        sqlx::query_as::<_, AvailabilityRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM availability
            WHERE owner_id = $1 AND date = $2
            ORDER BY date, category_type_id
            "#
        ))
        .bind(owner_id)
        .bind(date)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_date_range(
        pool: &PgPool,
        owner_id: Uuid,
        start: Date,
        end: Date,
    ) -> Result<Vec<AvailabilityRecord>, sqlx::Error> {
        sqlx::query_as::<_, AvailabilityRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM availability
            WHERE owner_id = $1 AND date >= $2 AND date <= $3
            ORDER BY date, category_type_id
            "#
        ))
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: Uuid,
        date: Date,
        category_type_id: Option<Uuid>,
        status: AvailabilityStatus,
        time_slots: Option<&[TimeSlot]>,
        reason: Option<&str>,
    ) -> Result<AvailabilityRecord, sqlx::Error> {
        sqlx::query_as::<_, AvailabilityRecord>(&format!(
            r#"
            INSERT INTO availability (owner_id, date, category_type_id, status, time_slots, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(date)
        .bind(category_type_id)
        .bind(status)
        .bind(time_slots.map(|s| Json(s.to_vec())))
        .bind(reason)
        .fetch_one(&mut **tx)
        .await
    }

    /// Full patch of the mutable fields; `time_slots` and `reason` are
    /// overwritten (not coalesced) so a cleared restriction stays cleared.
    pub async fn update(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: AvailabilityStatus,
        time_slots: Option<&[TimeSlot]>,
        reason: Option<&str>,
    ) -> Result<AvailabilityRecord, sqlx::Error> {
        sqlx::query_as::<_, AvailabilityRecord>(&format!(
            r#"
            UPDATE availability
            SET status = $1, time_slots = $2, reason = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(time_slots.map(|s| Json(s.to_vec())))
        .bind(reason)
        .bind(id)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn delete_by_id(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM availability WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete by key; omitting the category type clears every record on the
    /// date (compatibility mode for pre-categorized data).
    pub async fn delete_by_key(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: Uuid,
        date: Date,
        category_type_id: Option<Uuid>,
    ) -> Result<u64, sqlx::Error> {
        let result = match category_type_id {
            Some(category_type_id) => {
                sqlx::query(
                    "DELETE FROM availability
                     WHERE owner_id = $1 AND date = $2 AND category_type_id = $3",
                )
                .bind(owner_id)
                .bind(date)
                .bind(category_type_id)
                .execute(&mut **tx)
                .await?
            }
            None => {
                sqlx::query("DELETE FROM availability WHERE owner_id = $1 AND date = $2")
                    .bind(owner_id)
                    .bind(date)
                    .execute(&mut **tx)
                    .await?
            }
        };
        Ok(result.rows_affected())
    }

    pub async fn delete_range(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: Uuid,
        start: Date,
        end: Date,
        category_type_id: Option<Uuid>,
    ) -> Result<u64, sqlx::Error> {
        let result = match category_type_id {
            Some(category_type_id) => {
                sqlx::query(
                    "DELETE FROM availability
                     WHERE owner_id = $1 AND date >= $2 AND date <= $3 AND category_type_id = $4",
                )
                .bind(owner_id)
                .bind(start)
                .bind(end)
                .bind(category_type_id)
                .execute(&mut **tx)
                .await?
            }
            None => {
                sqlx::query(
                    "DELETE FROM availability
                     WHERE owner_id = $1 AND date >= $2 AND date <= $3",
                )
                .bind(owner_id)
                .bind(start)
                .bind(end)
                .execute(&mut **tx)
                .await?
            }
        };
        Ok(result.rows_affected())
    }

    /// Delete open (available/partial) records on the given dates. Used by
    /// the weekend bulk operation: with a category type the default-closed
    /// invariant makes explicit unavailable rows redundant, so open rows are
    /// removed outright.
    pub async fn delete_open_records_on_dates(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: Uuid,
        dates: &[Date],
        category_type_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM availability
             WHERE owner_id = $1 AND date = ANY($2) AND category_type_id = $3
               AND status IN ('available', 'partial')",
        )
        .bind(owner_id)
        .bind(dates)
        .bind(category_type_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}
