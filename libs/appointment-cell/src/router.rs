// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, MethodRouter},
};

use crate::handlers;
use crate::services::booking::BookingService;

type AppState = Arc<BookingService>;

// Each path is also served with a trailing slash, the form existing clients use.
fn route_with_slash(router: Router<AppState>, path: &str, method_router: MethodRouter<AppState>) -> Router<AppState> {
    router
        .route(path, method_router.clone())
        .route(&format!("{}/", path), method_router)
}

pub fn appointment_routes(service: Arc<BookingService>) -> Router {
    let router = Router::new();

    // Doctor: slot management
    let router = route_with_slash(router, "/doctor", get(handlers::list_appointments).post(handlers::generate_slots));
    let router = route_with_slash(router, "/doctor/{appointment_id}", delete(handlers::delete_appointment));

    // Listings
    let router = route_with_slash(router, "/available/{date}", get(handlers::list_available_appointments));
    let router = route_with_slash(router, "/patient/{phone_number}", get(handlers::list_patient_appointments));

    // Patient: claim a slot
    let router = route_with_slash(router, "/patient", post(handlers::claim_appointment));

    router.with_state(service)
}
