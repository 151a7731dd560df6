use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use sqlx::types::Uuid;
use time::OffsetDateTime;

use crate::app_state::AppState;
use crate::db::{CatalogRepository, CollectiveSlot, CollectiveSlotRepository};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub service_id: Uuid,
    pub animal_count: i32,
    pub animal_type: String,
}

/// Bookable group-session slots for the client-side picker. Eligibility
/// (capacity, animal compatibility, cancelled/past slots) is filtered here;
/// the picker only renders and selects.
pub async fn get_available_slots(
    State(state): State<AppState>,
    Query(query): Query<AvailableSlotsQuery>,
) -> AppResult<Json<Vec<CollectiveSlot>>> {
    if query.animal_count < 1 {
        return Err(AppError::Validation(
            "animal_count must be at least 1".to_string(),
        ));
    }

    let service = CatalogRepository::find_service(&state.db, query.service_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {}", query.service_id)))?;

    let today = OffsetDateTime::now_utc().date();
    let slots = CollectiveSlotRepository::available_slots(
        &state.db,
        service.id,
        query.animal_count,
        &query.animal_type,
        today,
    )
    .await?;

    Ok(Json(slots))
}
