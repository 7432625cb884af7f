//! Booking repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{FromRow, PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::{
    BookingStore, SLOT_DETAILS_COLUMNS, SLOT_DETAILS_JOINS, SLOT_WITH_BOOKING_SELECT,
    slot_details_from_row, slot_with_booking_from_row,
};
use crate::models::{
    UserSummary,
    booking::{Booking, BookingDetails, BookingStatus, BookingUpdate, NewBooking},
    slot::{SlotStatus, SlotWithBooking},
};

/// Booking repository for database operations
#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_details(&self, filter: &str, order: &str, id: Uuid) -> DatabaseResult<Vec<BookingDetails>> {
        let sql = format!(
            r#"
            SELECT b.id, b.slot_id, b.client_id, b.notes, b.status, b.created_at, b.updated_at,
                   c.name AS c_name, c.email AS c_email, c.avatar_url AS c_avatar_url,
                   {SLOT_DETAILS_COLUMNS}
            FROM bookings b
            JOIN users c ON c.id = b.client_id
            JOIN slots s ON s.id = b.slot_id
            {SLOT_DETAILS_JOINS}
            WHERE {filter} = $1
            ORDER BY {order}
            "#
        );

        let rows = sqlx::query(&sql).bind(id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| details_from_row(row).map_err(DatabaseError::from))
            .collect()
    }
}

fn details_from_row(row: &PgRow) -> Result<BookingDetails, sqlx::Error> {
    let booking = Booking::from_row(row)?;

    Ok(BookingDetails {
        client: UserSummary {
            id: booking.client_id,
            name: row.try_get("c_name")?,
            email: row.try_get("c_email")?,
            avatar_url: row.try_get("c_avatar_url")?,
        },
        slot: slot_details_from_row(row)?,
        booking,
    })
}

#[async_trait]
impl BookingStore for BookingRepository {
    async fn find_slot(&self, slot_id: Uuid) -> DatabaseResult<Option<SlotWithBooking>> {
        let sql = format!("{SLOT_WITH_BOOKING_SELECT} WHERE s.id = $1");

        let row = sqlx::query(&sql)
            .bind(slot_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(slot_with_booking_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, booking: &NewBooking) -> DatabaseResult<()> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            r#"
            UPDATE slots SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = $3
            "#,
        )
        .bind(booking.slot_id)
        .bind(SlotStatus::Booked)
        .bind(SlotStatus::Open)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            return Err(DatabaseError::Conflict(
                "Slot is not available for booking".to_string(),
            ));
        }

        // The partial unique index on active bookings backs up the slot claim
        sqlx::query(
            r#"
            INSERT INTO bookings (id, slot_id, client_id, notes, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(booking.id)
        .bind(booking.slot_id)
        .bind(booking.client_id)
        .bind(&booking.notes)
        .bind(BookingStatus::Confirmed)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<BookingDetails>> {
        let mut details = self.fetch_details("b.id", "b.created_at DESC", id).await?;
        Ok(details.pop())
    }

    async fn apply_update(&self, update: &BookingUpdate) -> DatabaseResult<()> {
        let mut tx = self.pool.begin().await?;

        if let Some(change) = update.status {
            let moved = sqlx::query(
                r#"
                UPDATE bookings SET status = $2, updated_at = NOW()
                WHERE id = $1 AND status = $3
                "#,
            )
            .bind(update.booking_id)
            .bind(change.to.booking)
            .bind(change.from)
            .execute(&mut *tx)
            .await?;

            if moved.rows_affected() == 0 {
                return Err(DatabaseError::Conflict(
                    "Booking was modified concurrently".to_string(),
                ));
            }

            sqlx::query("UPDATE slots SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(update.slot_id)
                .bind(change.to.slot)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(notes) = &update.notes {
            let result = sqlx::query("UPDATE bookings SET notes = $2, updated_at = NOW() WHERE id = $1")
                .bind(update.booking_id)
                .bind(notes)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                return Err(DatabaseError::NotFound);
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_for_client(&self, client_id: Uuid) -> DatabaseResult<Vec<BookingDetails>> {
        self.fetch_details("b.client_id", "b.created_at DESC", client_id)
            .await
    }

    async fn list_for_trainer(&self, trainer_id: Uuid) -> DatabaseResult<Vec<BookingDetails>> {
        self.fetch_details("s.owner_id", "s.start_time ASC", trainer_id)
            .await
    }
}
