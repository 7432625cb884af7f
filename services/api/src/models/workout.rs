//! Workout plan models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Workout plan with its exercises ordered by `order`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Planned duration in minutes
    pub duration: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    pub workout_plan_id: Uuid,
    pub name: String,
    pub sets: i32,
    pub reps: i32,
    pub notes: Option<String>,
    pub order: i32,
}

/// Exercise as submitted by the caller
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseInput {
    pub name: String,
    pub sets: i32,
    pub reps: i32,
    pub notes: Option<String>,
    pub order: Option<i32>,
}

/// Exercise ready for insertion, with its position resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NewExercise {
    pub name: String,
    pub sets: i32,
    pub reps: i32,
    pub notes: Option<String>,
    pub order: i32,
}

/// Resolve positions: an explicit `order` wins, otherwise the list index is used
pub fn number_exercises(inputs: &[ExerciseInput]) -> Vec<NewExercise> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| NewExercise {
            name: input.name.clone(),
            sets: input.sets,
            reps: input.reps,
            notes: input.notes.clone(),
            order: input.order.unwrap_or(index as i32),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct NewWorkoutPlan {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration: i32,
}

/// Request for workout plan creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkoutPlanRequest {
    pub name: String,
    pub description: Option<String>,
    pub duration: i32,
    pub exercises: Vec<ExerciseInput>,
}

/// Partial update of a workout plan
///
/// `exercises`, when present, replaces the whole list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkoutPlanRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub exercises: Option<Vec<ExerciseInput>>,
}

impl UpdateWorkoutPlanRequest {
    /// Merge the present scalar fields over `current`; exercises are left as they are
    pub fn apply(&self, current: WorkoutPlan) -> WorkoutPlan {
        WorkoutPlan {
            name: self.name.clone().unwrap_or(current.name),
            description: self.description.clone().or(current.description),
            duration: self.duration.unwrap_or(current.duration),
            ..current
        }
    }
}
