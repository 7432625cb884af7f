//! Workout Plan Manager

use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::workout::{
        CreateWorkoutPlanRequest, NewWorkoutPlan, UpdateWorkoutPlanRequest, WorkoutPlan,
        number_exercises,
    },
    repositories::WorkoutStore,
};

#[derive(Clone)]
pub struct WorkoutService {
    store: Arc<dyn WorkoutStore>,
}

fn validate_plan(name: &str, duration: i32) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::InvalidInput("Workout plan name is required".to_string()));
    }
    if duration <= 0 {
        return Err(ApiError::InvalidInput(
            "Workout plan duration must be a positive number of minutes".to_string(),
        ));
    }
    Ok(())
}

impl WorkoutService {
    pub fn new(store: Arc<dyn WorkoutStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, owner_id: Uuid, request: CreateWorkoutPlanRequest) -> ApiResult<WorkoutPlan> {
        validate_plan(&request.name, request.duration)?;

        let plan = NewWorkoutPlan {
            id: Uuid::new_v4(),
            owner_id,
            name: request.name,
            description: request.description,
            duration: request.duration,
        };
        let exercises = number_exercises(&request.exercises);

        self.store.create(&plan, &exercises).await?;
        info!(
            "Workout plan {} created by {} with {} exercises",
            plan.id,
            owner_id,
            exercises.len()
        );

        self.store.find_by_id(plan.id).await?.ok_or_else(|| {
            error!("Workout plan {} vanished after creation", plan.id);
            ApiError::InternalServerError
        })
    }

    pub async fn list(&self, owner_id: Uuid) -> ApiResult<Vec<WorkoutPlan>> {
        Ok(self.store.list_by_owner(owner_id).await?)
    }

    pub async fn get(&self, caller_id: Uuid, id: Uuid) -> ApiResult<WorkoutPlan> {
        let plan = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Workout plan"))?;

        if plan.owner_id != caller_id {
            return Err(ApiError::forbidden(
                "You do not have permission to access this workout plan",
            ));
        }

        Ok(plan)
    }

    /// Merge present fields; a supplied exercise list replaces the stored one
    pub async fn update(
        &self,
        caller_id: Uuid,
        id: Uuid,
        request: UpdateWorkoutPlanRequest,
    ) -> ApiResult<WorkoutPlan> {
        let current = self.get(caller_id, id).await?;
        let merged = request.apply(current);
        validate_plan(&merged.name, merged.duration)?;

        let exercises = request.exercises.as_deref().map(number_exercises);
        self.store.update(&merged, exercises.as_deref()).await?;
        info!("Workout plan {} updated", id);

        self.get(caller_id, id).await
    }

    pub async fn delete(&self, caller_id: Uuid, id: Uuid) -> ApiResult<()> {
        self.get(caller_id, id).await?;
        self.store.delete(id).await?;
        info!("Workout plan {} deleted", id);
        Ok(())
    }
}
