//! Booking models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    models::{UserSummary, slot::SlotDetails},
    transition::Transition,
};

/// Lifecycle of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "booking_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

/// A client's claim on a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub client_id: Uuid,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row to insert, always as `CONFIRMED`
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub client_id: Uuid,
    pub notes: Option<String>,
}

/// Booking joined with slot, trainer, availability and client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub slot: SlotDetails,
    pub client: UserSummary,
}

impl BookingDetails {
    /// Trainer owning the booked slot
    pub fn trainer_id(&self) -> Uuid {
        self.slot.slot.owner_id
    }
}

/// Request for booking creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub slot_id: Uuid,
    pub notes: Option<String>,
}

/// Request for booking update; absent fields are preserved
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    pub notes: Option<String>,
    pub status: Option<BookingStatus>,
}

/// Status change guarded by compare-and-set on the current booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: BookingStatus,
    pub to: Transition,
}

/// Writes applied to a booking (and possibly its slot) in one transaction
#[derive(Debug, Clone)]
pub struct BookingUpdate {
    pub booking_id: Uuid,
    pub slot_id: Uuid,
    pub notes: Option<String>,
    pub status: Option<StatusChange>,
}
