//! Workout plan repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use super::WorkoutStore;
use crate::models::workout::{Exercise, NewExercise, NewWorkoutPlan, WorkoutPlan};

/// Workout plan repository for database operations
#[derive(Clone)]
pub struct WorkoutRepository {
    pool: PgPool,
}

impl WorkoutRepository {
    /// Create a new workout plan repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exercises_for(&self, plan_ids: &[Uuid]) -> DatabaseResult<HashMap<Uuid, Vec<Exercise>>> {
        let exercises = sqlx::query_as::<_, Exercise>(
            r#"
            SELECT id, workout_plan_id, name, sets, reps, notes, "order"
            FROM exercises
            WHERE workout_plan_id = ANY($1)
            ORDER BY "order" ASC
            "#,
        )
        .bind(plan_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Exercise>> = HashMap::new();
        for exercise in exercises {
            grouped.entry(exercise.workout_plan_id).or_default().push(exercise);
        }

        Ok(grouped)
    }
}

async fn insert_exercises(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
    exercises: &[NewExercise],
) -> DatabaseResult<()> {
    if exercises.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        r#"INSERT INTO exercises (workout_plan_id, name, sets, reps, notes, "order") "#,
    );
    builder.push_values(exercises, |mut row, exercise| {
        row.push_bind(plan_id)
            .push_bind(&exercise.name)
            .push_bind(exercise.sets)
            .push_bind(exercise.reps)
            .push_bind(&exercise.notes)
            .push_bind(exercise.order);
    });
    builder.build().execute(&mut **tx).await?;

    Ok(())
}

#[async_trait]
impl WorkoutStore for WorkoutRepository {
    async fn create(&self, plan: &NewWorkoutPlan, exercises: &[NewExercise]) -> DatabaseResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO workout_plans (id, owner_id, name, description, duration)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(plan.id)
        .bind(plan.owner_id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.duration)
        .execute(&mut *tx)
        .await?;

        insert_exercises(&mut tx, plan.id, exercises).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<WorkoutPlan>> {
        let plan = sqlx::query_as::<_, WorkoutPlan>(
            r#"
            SELECT id, owner_id, name, description, duration, created_at, updated_at
            FROM workout_plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut plan) = plan else {
            return Ok(None);
        };

        plan.exercises = self.exercises_for(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(Some(plan))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> DatabaseResult<Vec<WorkoutPlan>> {
        let mut plans = sqlx::query_as::<_, WorkoutPlan>(
            r#"
            SELECT id, owner_id, name, description, duration, created_at, updated_at
            FROM workout_plans
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = plans.iter().map(|p| p.id).collect();
        let mut exercises = self.exercises_for(&ids).await?;

        for plan in &mut plans {
            plan.exercises = exercises.remove(&plan.id).unwrap_or_default();
        }

        Ok(plans)
    }

    async fn update(&self, plan: &WorkoutPlan, exercises: Option<&[NewExercise]>) -> DatabaseResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE workout_plans
            SET name = $2, description = $3, duration = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(plan.id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.duration)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }

        if let Some(exercises) = exercises {
            sqlx::query("DELETE FROM exercises WHERE workout_plan_id = $1")
                .bind(plan.id)
                .execute(&mut *tx)
                .await?;

            insert_exercises(&mut tx, plan.id, exercises).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM workout_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }

        Ok(())
    }
}
