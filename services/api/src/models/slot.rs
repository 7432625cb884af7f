//! Slot models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{UserSummary, availability::Availability, booking::BookingStatus};

/// Bookability of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "slot_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Open,
    Booked,
}

/// One-hour bookable unit generated from an availability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: Uuid,
    pub availability_id: Uuid,
    pub owner_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: SlotStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Slot produced by the generator, always inserted as `OPEN`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSlot {
    pub availability_id: Uuid,
    pub owner_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Active booking attached to a slot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotBooking {
    pub id: Uuid,
    pub client_id: Uuid,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub client: UserSummary,
}

/// Slot with its active (non-cancelled) booking, if any
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotWithBooking {
    #[serde(flatten)]
    pub slot: Slot,
    pub booking: Option<SlotBooking>,
}

/// Slot joined with its trainer and parent availability
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDetails {
    #[serde(flatten)]
    pub slot: Slot,
    pub trainer: UserSummary,
    pub availability: Availability,
}

/// Query parameters for open slot browsing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotQuery {
    pub date: Option<chrono::NaiveDate>,
}
