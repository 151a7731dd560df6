use axum::{routing::get, Router};

use super::handlers::get_available_slots;
use crate::app_state::AppState;

pub fn booking_routes() -> Router<AppState> {
    Router::new().route("/", get(get_available_slots))
}
