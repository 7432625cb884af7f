//! Repositories for database operations
//!
//! Each aggregate has a store trait consumed by the services and a PostgreSQL
//! implementation. Multi-row mutations run inside one transaction; the slot
//! and booking status flips are compare-and-set updates so that concurrent
//! writers observe a [`DatabaseError::Conflict`] instead of overwriting each
//! other.
//!
//! [`DatabaseError::Conflict`]: common::error::DatabaseError::Conflict

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::DatabaseResult;
use sqlx::{FromRow, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::{
    UserSummary,
    availability::{Availability, AvailabilityWithSlots, NewAvailability},
    booking::{BookingDetails, BookingUpdate, NewBooking},
    slot::{NewSlot, Slot, SlotBooking, SlotDetails, SlotWithBooking},
    workout::{NewExercise, NewWorkoutPlan, WorkoutPlan},
};

pub mod availability;
pub mod booking;
#[cfg(test)]
pub mod memory;
pub mod workout;

pub use availability::AvailabilityRepository;
pub use booking::BookingRepository;
pub use workout::WorkoutRepository;

#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Insert the availability and its slots atomically; no slot batch is
    /// written when `slots` is empty
    async fn create(&self, availability: &NewAvailability, slots: &[NewSlot]) -> DatabaseResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Availability>>;

    async fn find_with_slots(&self, id: Uuid) -> DatabaseResult<Option<AvailabilityWithSlots>>;

    /// Availabilities of one trainer, by date ascending
    async fn list_by_owner(&self, owner_id: Uuid) -> DatabaseResult<Vec<AvailabilityWithSlots>>;

    /// Overwrite the mutable columns with the given values
    async fn save(&self, availability: &Availability) -> DatabaseResult<()>;

    /// Remove the availability and its slots. Fails with `Conflict` when a
    /// slot is referenced by a booking.
    async fn delete(&self, id: Uuid) -> DatabaseResult<()>;

    /// Open slots starting in `[from, until]`, by start time ascending
    async fn open_slots(
        &self,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> DatabaseResult<Vec<SlotDetails>>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Slot with its active booking, if any
    async fn find_slot(&self, slot_id: Uuid) -> DatabaseResult<Option<SlotWithBooking>>;

    /// Flip the slot `OPEN` → `BOOKED` and insert the booking as `CONFIRMED`
    /// in one transaction. `Conflict` when the slot is no longer open.
    async fn create(&self, booking: &NewBooking) -> DatabaseResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<BookingDetails>>;

    /// Apply notes and/or a status transition in one transaction. The status
    /// write only succeeds if the booking is still in `status.from`.
    async fn apply_update(&self, update: &BookingUpdate) -> DatabaseResult<()>;

    /// Bookings made by a client, newest first
    async fn list_for_client(&self, client_id: Uuid) -> DatabaseResult<Vec<BookingDetails>>;

    /// Bookings on a trainer's slots, by slot start ascending
    async fn list_for_trainer(&self, trainer_id: Uuid) -> DatabaseResult<Vec<BookingDetails>>;
}

#[async_trait]
pub trait WorkoutStore: Send + Sync {
    async fn create(&self, plan: &NewWorkoutPlan, exercises: &[NewExercise]) -> DatabaseResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<WorkoutPlan>>;

    /// Plans of one owner, newest first
    async fn list_by_owner(&self, owner_id: Uuid) -> DatabaseResult<Vec<WorkoutPlan>>;

    /// Overwrite scalar fields; when `exercises` is given the existing list is
    /// deleted and replaced in the same transaction
    async fn update(&self, plan: &WorkoutPlan, exercises: Option<&[NewExercise]>) -> DatabaseResult<()>;

    async fn delete(&self, id: Uuid) -> DatabaseResult<()>;
}

/// Slot columns plus its active booking and that booking's client
const SLOT_WITH_BOOKING_SELECT: &str = r#"
    SELECT s.id, s.availability_id, s.owner_id, s.start_time, s.end_time, s.status,
           s.created_at, s.updated_at,
           b.id AS b_id, b.client_id AS b_client_id, b.notes AS b_notes,
           b.status AS b_status, b.created_at AS b_created_at,
           c.name AS c_name, c.email AS c_email, c.avatar_url AS c_avatar_url
    FROM slots s
    LEFT JOIN bookings b ON b.slot_id = s.id AND b.status <> 'CANCELLED'
    LEFT JOIN users c ON c.id = b.client_id
"#;

fn slot_with_booking_from_row(row: &PgRow) -> Result<SlotWithBooking, sqlx::Error> {
    let slot = Slot::from_row(row)?;

    let booking = match row.try_get::<Option<Uuid>, _>("b_id")? {
        Some(id) => {
            let client_id: Uuid = row.try_get("b_client_id")?;
            Some(SlotBooking {
                id,
                client_id,
                notes: row.try_get("b_notes")?,
                status: row.try_get("b_status")?,
                created_at: row.try_get("b_created_at")?,
                client: UserSummary {
                    id: client_id,
                    name: row.try_get("c_name")?,
                    email: row.try_get("c_email")?,
                    avatar_url: row.try_get("c_avatar_url")?,
                },
            })
        }
        None => None,
    };

    Ok(SlotWithBooking { slot, booking })
}

/// Prefixed slot, trainer (`t`) and availability (`a`) columns; pair with
/// [`SLOT_DETAILS_JOINS`] on a query that aliases `slots` as `s`
const SLOT_DETAILS_COLUMNS: &str = r#"
    s.id AS s_id, s.availability_id AS s_availability_id, s.owner_id AS s_owner_id,
    s.start_time AS s_start_time, s.end_time AS s_end_time, s.status AS s_status,
    s.created_at AS s_created_at, s.updated_at AS s_updated_at,
    t.name AS t_name, t.email AS t_email, t.avatar_url AS t_avatar_url,
    a.id AS a_id, a.owner_id AS a_owner_id, a.date AS a_date,
    a.start_time AS a_start_time, a.end_time AS a_end_time,
    a.is_recurring AS a_is_recurring, a.day_of_week AS a_day_of_week,
    a.created_at AS a_created_at, a.updated_at AS a_updated_at
"#;

const SLOT_DETAILS_JOINS: &str = r#"
    JOIN users t ON t.id = s.owner_id
    JOIN availabilities a ON a.id = s.availability_id
"#;

fn slot_details_from_row(row: &PgRow) -> Result<SlotDetails, sqlx::Error> {
    let owner_id: Uuid = row.try_get("s_owner_id")?;

    Ok(SlotDetails {
        slot: Slot {
            id: row.try_get("s_id")?,
            availability_id: row.try_get("s_availability_id")?,
            owner_id,
            start_time: row.try_get("s_start_time")?,
            end_time: row.try_get("s_end_time")?,
            status: row.try_get("s_status")?,
            created_at: row.try_get("s_created_at")?,
            updated_at: row.try_get("s_updated_at")?,
        },
        trainer: UserSummary {
            id: owner_id,
            name: row.try_get("t_name")?,
            email: row.try_get("t_email")?,
            avatar_url: row.try_get("t_avatar_url")?,
        },
        availability: Availability {
            id: row.try_get("a_id")?,
            owner_id: row.try_get("a_owner_id")?,
            date: row.try_get("a_date")?,
            start_time: row.try_get("a_start_time")?,
            end_time: row.try_get("a_end_time")?,
            is_recurring: row.try_get("a_is_recurring")?,
            day_of_week: row.try_get("a_day_of_week")?,
            created_at: row.try_get("a_created_at")?,
            updated_at: row.try_get("a_updated_at")?,
        },
    })
}
