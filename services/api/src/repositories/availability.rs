//! Availability repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

use super::{
    AvailabilityStore, SLOT_DETAILS_COLUMNS, SLOT_DETAILS_JOINS, SLOT_WITH_BOOKING_SELECT,
    slot_details_from_row, slot_with_booking_from_row,
};
use crate::models::{
    availability::{Availability, AvailabilityWithSlots, NewAvailability},
    slot::{NewSlot, SlotDetails, SlotWithBooking},
};

/// Availability repository for database operations
#[derive(Clone)]
pub struct AvailabilityRepository {
    pool: PgPool,
}

impl AvailabilityRepository {
    /// Create a new availability repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Slots of the given availabilities grouped by parent, each group by start time
    async fn slots_for(&self, ids: &[Uuid]) -> DatabaseResult<HashMap<Uuid, Vec<SlotWithBooking>>> {
        let sql = format!(
            "{SLOT_WITH_BOOKING_SELECT} WHERE s.availability_id = ANY($1) ORDER BY s.start_time ASC"
        );

        let rows = sqlx::query(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<Uuid, Vec<SlotWithBooking>> = HashMap::new();
        for row in &rows {
            let slot = slot_with_booking_from_row(row)?;
            grouped.entry(slot.slot.availability_id).or_default().push(slot);
        }

        Ok(grouped)
    }
}

#[async_trait]
impl AvailabilityStore for AvailabilityRepository {
    async fn create(&self, availability: &NewAvailability, slots: &[NewSlot]) -> DatabaseResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO availabilities (id, owner_id, date, start_time, end_time, is_recurring, day_of_week)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(availability.id)
        .bind(availability.owner_id)
        .bind(availability.date)
        .bind(&availability.start_time)
        .bind(&availability.end_time)
        .bind(availability.is_recurring)
        .bind(availability.day_of_week)
        .execute(&mut *tx)
        .await?;

        if !slots.is_empty() {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO slots (availability_id, owner_id, start_time, end_time) ",
            );
            builder.push_values(slots, |mut row, slot| {
                row.push_bind(slot.availability_id)
                    .push_bind(slot.owner_id)
                    .push_bind(slot.start_time)
                    .push_bind(slot.end_time);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Availability>> {
        let availability = sqlx::query_as::<_, Availability>(
            r#"
            SELECT id, owner_id, date, start_time, end_time, is_recurring, day_of_week,
                   created_at, updated_at
            FROM availabilities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(availability)
    }

    async fn find_with_slots(&self, id: Uuid) -> DatabaseResult<Option<AvailabilityWithSlots>> {
        let Some(availability) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut slots = self.slots_for(&[id]).await?;

        Ok(Some(AvailabilityWithSlots {
            slots: slots.remove(&id).unwrap_or_default(),
            availability,
        }))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> DatabaseResult<Vec<AvailabilityWithSlots>> {
        let availabilities = sqlx::query_as::<_, Availability>(
            r#"
            SELECT id, owner_id, date, start_time, end_time, is_recurring, day_of_week,
                   created_at, updated_at
            FROM availabilities
            WHERE owner_id = $1
            ORDER BY date ASC, start_time ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = availabilities.iter().map(|a| a.id).collect();
        let mut slots = self.slots_for(&ids).await?;

        Ok(availabilities
            .into_iter()
            .map(|availability| AvailabilityWithSlots {
                slots: slots.remove(&availability.id).unwrap_or_default(),
                availability,
            })
            .collect())
    }

    async fn save(&self, availability: &Availability) -> DatabaseResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE availabilities
            SET date = $2, start_time = $3, end_time = $4, is_recurring = $5,
                day_of_week = $6, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(availability.id)
        .bind(availability.date)
        .bind(&availability.start_time)
        .bind(&availability.end_time)
        .bind(availability.is_recurring)
        .bind(availability.day_of_week)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        // Slots cascade; a booked slot blocks the delete through its foreign key
        let result = sqlx::query("DELETE FROM availabilities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }

        Ok(())
    }

    async fn open_slots(
        &self,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> DatabaseResult<Vec<SlotDetails>> {
        let sql = format!(
            r#"
            SELECT {SLOT_DETAILS_COLUMNS}
            FROM slots s
            {SLOT_DETAILS_JOINS}
            WHERE s.status = 'OPEN'
              AND s.start_time >= $1
              AND ($2::timestamptz IS NULL OR s.start_time <= $2)
            ORDER BY s.start_time ASC
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(from)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| slot_details_from_row(row).map_err(DatabaseError::from))
            .collect()
    }
}
