use axum::{routing::get, Router};

use super::handlers::{admin_clear_availability, admin_get_user_availability};
use crate::app_state::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/users/{user_id}/availability",
        get(admin_get_user_availability).delete(admin_clear_availability),
    )
}
