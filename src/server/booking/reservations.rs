use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{CreatedResponse, ReservationRequest};
use crate::server::response::{ApiError, MessageResponse, StoreResultExt};
use crate::server::validation::reservation_input;

pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReservationRequest>,
) -> impl IntoResponse {
    let input = reservation_input(req)?;

    let id = state
        .store
        .create_reservation(&input)
        .api_err("Failed to book reservation.")?;

    tracing::info!(
        "Reservation {} booked for {} on {} {}",
        id,
        input.guest_number,
        input.date,
        input.time
    );

    Ok::<_, ApiError>(Json(CreatedResponse {
        message: "Reservation booked successfully!",
        id,
    }))
}

pub async fn list_reservations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let reservations = state
        .store
        .list_reservations()
        .api_err("Failed to list reservations")?;

    Ok::<_, ApiError>(Json(reservations))
}

pub async fn update_reservation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ReservationRequest>,
) -> impl IntoResponse {
    let input = reservation_input(req)?;

    match state.store.update_reservation(id, &input) {
        Ok(()) => {}
        Err(Error::NotFound) => return Err(ApiError::not_found("Reservation not found")),
        Err(e) => return Err(ApiError::from_store(e, "Failed to update reservation")),
    }

    Ok::<_, ApiError>(MessageResponse::new("Updated successfully"))
}

pub async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let deleted = state
        .store
        .delete_reservation(id)
        .api_err("Failed to delete reservation")?;

    if !deleted {
        return Err(ApiError::not_found("Reservation not found"));
    }

    Ok::<_, ApiError>(MessageResponse::new("Deleted successfully"))
}
