use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use sqlx::types::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth;
use crate::db::{
    AvailabilityRecord, BulkResult, ClearResult, DuplicateWeekPayload, RangeUpdateResult,
    SetAvailabilityPayload, SetAvailabilityRangePayload, SetAvailabilityResult,
    ToggleAvailabilityPayload, ToggleResult, WeekDayAvailability, WeekendsUnavailablePayload,
};
use crate::error::{AppError, AppResult};
use crate::scheduling::calendar::parse_local_date;
use crate::scheduling::service::AvailabilityService;
use crate::scheduling::week_template::DuplicationSummary;

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: String,
    pub end_date: String,
    pub category_type_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryTypeQuery {
    pub category_type_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub week_start: String,
}

fn validated<T: Validate>(payload: T) -> AppResult<T> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(payload)
}

/// Range read. Degrades to an empty list without a valid session so
/// calendar views never hard-fail on an expired login.
pub async fn get_availability_by_date_range(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<AvailabilityRecord>>> {
    let Some((_, user)) = auth::resolve_session(&state.db, &headers).await? else {
        return Ok(Json(Vec::new()));
    };

    let start = parse_local_date(&query.start_date)?;
    let end = parse_local_date(&query.end_date)?;
    let records = AvailabilityService::get_by_date_range(&state.db, user.id, start, end).await?;
    Ok(Json(records))
}

pub async fn get_week_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WeekQuery>,
) -> AppResult<Json<Vec<WeekDayAvailability>>> {
    let Some((_, user)) = auth::resolve_session(&state.db, &headers).await? else {
        return Ok(Json(Vec::new()));
    };

    let week_start = parse_local_date(&query.week_start)?;
    let week = AvailabilityService::get_week(&state.db, user.id, week_start).await?;
    Ok(Json(week))
}

pub async fn get_availability_by_date(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(date): Path<String>,
    Query(query): Query<CategoryTypeQuery>,
) -> AppResult<Json<Option<AvailabilityRecord>>> {
    let Some((_, user)) = auth::resolve_session(&state.db, &headers).await? else {
        return Ok(Json(None));
    };

    let date = parse_local_date(&date)?;
    let record =
        AvailabilityService::get_by_date(&state.db, user.id, date, query.category_type_id).await?;
    Ok(Json(record))
}

pub async fn set_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SetAvailabilityPayload>,
) -> AppResult<Json<SetAvailabilityResult>> {
    let user = auth::require_announcer(&state.db, &headers).await?;
    let payload = validated(payload)?;

    let date = parse_local_date(&payload.date)?;
    let record = AvailabilityService::set_availability(
        &state.db,
        user.id,
        date,
        payload.category_type_id,
        payload.status,
        payload.time_slots,
        payload.reason,
    )
    .await?;

    Ok(Json(SetAvailabilityResult {
        success: true,
        id: record.id,
    }))
}

pub async fn set_availability_range(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SetAvailabilityRangePayload>,
) -> AppResult<Json<RangeUpdateResult>> {
    let user = auth::require_announcer(&state.db, &headers).await?;
    let payload = validated(payload)?;

    let start = parse_local_date(&payload.start_date)?;
    let end = parse_local_date(&payload.end_date)?;
    let dates_updated = AvailabilityService::set_availability_range(
        &state.db,
        user.id,
        start,
        end,
        payload.category_type_id,
        payload.status,
        payload.time_slots,
        payload.reason,
    )
    .await?;

    Ok(Json(RangeUpdateResult {
        success: true,
        dates_updated,
    }))
}

pub async fn toggle_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ToggleAvailabilityPayload>,
) -> AppResult<Json<ToggleResult>> {
    let user = auth::require_announcer(&state.db, &headers).await?;
    let payload = validated(payload)?;

    let date = parse_local_date(&payload.date)?;
    let status = AvailabilityService::toggle_availability(
        &state.db,
        user.id,
        date,
        payload.category_type_id,
    )
    .await?;

    Ok(Json(ToggleResult { status }))
}

pub async fn set_weekends_unavailable(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WeekendsUnavailablePayload>,
) -> AppResult<Json<BulkResult>> {
    let user = auth::require_announcer(&state.db, &headers).await?;
    let payload = validated(payload)?;

    let affected = AvailabilityService::set_weekends_unavailable(
        &state.db,
        user.id,
        payload.month,
        payload.year,
        payload.category_type_id,
    )
    .await?;

    Ok(Json(BulkResult {
        success: true,
        affected,
    }))
}

pub async fn duplicate_week_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<DuplicateWeekPayload>,
) -> AppResult<Json<DuplicationSummary>> {
    let user = auth::require_announcer(&state.db, &headers).await?;
    let payload = validated(payload)?;

    let source_week_start = parse_local_date(&payload.source_week_start)?;
    let target_start = parse_local_date(&payload.target_start)?;
    let target_end = parse_local_date(&payload.target_end)?;

    let summary = AvailabilityService::duplicate_week(
        &state.db,
        user.id,
        source_week_start,
        target_start,
        target_end,
        payload.overwrite_existing.unwrap_or(true),
    )
    .await?;

    Ok(Json(summary))
}

pub async fn clear_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(date): Path<String>,
    Query(query): Query<CategoryTypeQuery>,
) -> AppResult<Json<ClearResult>> {
    let user = auth::require_announcer(&state.db, &headers).await?;

    let date = parse_local_date(&date)?;
    let deleted =
        AvailabilityService::clear_availability(&state.db, user.id, date, query.category_type_id)
            .await?;

    Ok(Json(ClearResult {
        success: true,
        deleted,
    }))
}

pub async fn clear_availability_range(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<ClearResult>> {
    let user = auth::require_announcer(&state.db, &headers).await?;

    let start = parse_local_date(&query.start_date)?;
    let end = parse_local_date(&query.end_date)?;
    let deleted = AvailabilityService::clear_availability_range(
        &state.db,
        user.id,
        start,
        end,
        query.category_type_id,
    )
    .await?;

    Ok(Json(ClearResult {
        success: true,
        deleted,
    }))
}

pub async fn clear_availability_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(record_id): Path<Uuid>,
) -> AppResult<Json<ClearResult>> {
    let user = auth::require_announcer(&state.db, &headers).await?;

    AvailabilityService::clear_availability_record(&state.db, user.id, record_id).await?;
    Ok(Json(ClearResult {
        success: true,
        deleted: 1,
    }))
}
