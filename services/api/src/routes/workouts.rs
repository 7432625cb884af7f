//! Workout plan routes

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
        workout::{CreateWorkoutPlanRequest, UpdateWorkoutPlanRequest},
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", get(get_workout_plans).post(create_workout_plan))
        .route(
            "/workouts/:id",
            get(get_workout_plan)
                .put(update_workout_plan)
                .delete(delete_workout_plan),
        )
}

pub async fn create_workout_plan(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateWorkoutPlanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let plan = state.workouts.create(principal.id, payload).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn get_workout_plans(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.workouts.list(principal.id).await?))
}

pub async fn get_workout_plan(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.workouts.get(principal.id, id).await?))
}

pub async fn update_workout_plan(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkoutPlanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.workouts.update(principal.id, id, payload).await?))
}

pub async fn delete_workout_plan(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.workouts.delete(principal.id, id).await?;
    Ok(Json(MessageResponse::new("Workout plan deleted successfully")))
}
