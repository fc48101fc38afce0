mod reservations;
mod tables;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::server::AppState;

pub fn booking_router() -> Router<Arc<AppState>> {
    Router::new()
        // Reservations
        .route("/reservation", get(reservations::list_reservations))
        .route("/reservation/create", post(reservations::create_reservation))
        .route(
            "/reservation/update/{id}",
            put(reservations::update_reservation),
        )
        .route(
            "/reservation/delete/{id}",
            delete(reservations::delete_reservation),
        )
        // Floor plan
        .route("/tables", get(tables::get_layout))
        .route("/tables/update-layout", post(tables::update_layout))
}
