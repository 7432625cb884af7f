//! Booking routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use common::Principal;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{
        MessageResponse,
        booking::{CreateBookingRequest, UpdateBookingRequest},
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(get_all_bookings).post(create_booking))
        .route("/bookings/trainer", get(get_trainer_bookings))
        .route(
            "/bookings/:id",
            get(get_booking).put(update_booking).delete(cancel_booking),
        )
}

/// Book an open slot for the caller
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state.bookings.create(principal.id, payload).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Bookings made by the caller
pub async fn get_all_bookings(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.bookings.list_for_client(principal.id).await?))
}

/// Bookings on the caller's slots
pub async fn get_trainer_bookings(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.bookings.list_for_trainer(principal.id).await?))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.bookings.get(principal.id, id).await?))
}

pub async fn update_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.bookings.update(principal.id, id, payload).await?))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.bookings.cancel(principal.id, id).await?;
    Ok(Json(MessageResponse::new("Booking cancelled successfully")))
}
