use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn schedule_routes(state: Arc<AppConfig>) -> Router {
    // Public routes: availability and leave lookups feed booking screens
    let public_routes = Router::new()
        .route("/{doctor_id}/available-slots", get(handlers::get_available_slots))
        .route("/{doctor_id}/leave", get(handlers::check_leave));

    // Protected routes: only the owning doctor (or their receptionist) edits
    // the weekly template and leaves
    let protected_routes = Router::new()
        .route("/{doctor_id}/schedule", get(handlers::get_weekly_schedule))
        .route("/{doctor_id}/schedule/{day_of_week}", put(handlers::upsert_schedule))
        .route("/{doctor_id}/leaves", post(handlers::create_leave))
        .route("/{doctor_id}/leaves/{date}", delete(handlers::cancel_leave))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
