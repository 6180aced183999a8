use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use appointment_cell::services::BookingService;

pub fn create_router(service: Arc<BookingService>) -> Router {
    Router::new()
        .route("/", get(|| async { "Appointment booking API is running!" }))
        .nest("/appointment", appointment_routes(service))
}
