use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use sqlx::types::Uuid;
use tracing::info;

use crate::app_state::AppState;
use crate::auth;
use crate::db::{AvailabilityRecord, ClearResult};
use crate::error::AppResult;
use crate::scheduling::calendar::parse_local_date;
use crate::scheduling::service::AvailabilityService;

#[derive(Debug, Deserialize)]
pub struct AdminRangeQuery {
    pub start_date: String,
    pub end_date: String,
    pub category_type_id: Option<Uuid>,
}

/// Privileged read of any announcer's calendar. Requires an admin session;
/// unlike the owner-facing reads this one fails rather than degrading, so
/// back-office tooling notices a broken session immediately.
pub async fn admin_get_user_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
    Query(query): Query<AdminRangeQuery>,
) -> AppResult<Json<Vec<AvailabilityRecord>>> {
    auth::require_admin(&state.db, &headers).await?;

    let start = parse_local_date(&query.start_date)?;
    let end = parse_local_date(&query.end_date)?;
    let records = AvailabilityService::get_by_date_range(&state.db, user_id, start, end).await?;
    Ok(Json(records))
}

pub async fn admin_clear_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
    Query(query): Query<AdminRangeQuery>,
) -> AppResult<Json<ClearResult>> {
    let admin = auth::require_admin(&state.db, &headers).await?;

    let start = parse_local_date(&query.start_date)?;
    let end = parse_local_date(&query.end_date)?;
    let deleted = AvailabilityService::clear_availability_range(
        &state.db,
        user_id,
        start,
        end,
        query.category_type_id,
    )
    .await?;

    info!(admin = %admin.id, user = %user_id, deleted, "admin cleared availability");
    Ok(Json(ClearResult {
        success: true,
        deleted,
    }))
}
