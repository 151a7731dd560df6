use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::handlers::{
    clear_availability, clear_availability_range, clear_availability_record,
    duplicate_week_availability, get_availability_by_date, get_availability_by_date_range,
    get_week_availability, set_availability, set_availability_range, set_weekends_unavailable,
    toggle_availability,
};
use crate::app_state::AppState;

pub fn availability_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_availability_by_date_range).put(set_availability))
        .route("/week", get(get_week_availability))
        .route("/range", put(set_availability_range).delete(clear_availability_range))
        .route("/toggle", post(toggle_availability))
        .route("/weekends", post(set_weekends_unavailable))
        .route("/duplicate-week", post(duplicate_week_availability))
        .route("/record/{record_id}", delete(clear_availability_record))
        .route("/{date}", get(get_availability_by_date).delete(clear_availability))
}
