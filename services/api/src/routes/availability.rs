//! Availability and slot browsing routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
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
        availability::{AvailabilityPatch, CreateAvailabilityRequest},
        slot::SlotQuery,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/availability",
            get(get_all_availabilities).post(create_availability),
        )
        .route("/availability/slots", get(get_available_slots))
        .route(
            "/availability/:id",
            get(get_availability)
                .put(update_availability)
                .delete(delete_availability),
        )
}

/// Create an availability and generate its slots
pub async fn create_availability(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateAvailabilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let availability = state.availability.create(principal.id, payload).await?;
    Ok((StatusCode::CREATED, Json(availability)))
}

/// Get the caller's availabilities with their slots
pub async fn get_all_availabilities(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.availability.list(principal.id).await?))
}

/// Get open slots for a day, or all upcoming ones
pub async fn get_available_slots(
    State(state): State<AppState>,
    Query(query): Query<SlotQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.availability.open_slots(query.date).await?))
}

pub async fn get_availability(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.availability.get(principal.id, id).await?))
}

pub async fn update_availability(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AvailabilityPatch>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.availability.update(principal.id, id, patch).await?))
}

pub async fn delete_availability(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.availability.delete(principal.id, id).await?;
    Ok(Json(MessageResponse::new("Availability deleted successfully")))
}
