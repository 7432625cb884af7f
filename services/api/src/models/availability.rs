//! Availability models for the API service

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::slot::SlotWithBooking;

/// A trainer-declared time window on one calendar day
///
/// `start_time`/`end_time` keep the `HH:mm` text the trainer submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub is_recurring: bool,
    pub day_of_week: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row to insert; the id is assigned up front so generated slots can refer to it
#[derive(Debug, Clone)]
pub struct NewAvailability {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub is_recurring: bool,
    pub day_of_week: Option<i16>,
}

/// Availability together with the slots generated from it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWithSlots {
    #[serde(flatten)]
    pub availability: Availability,
    pub slots: Vec<SlotWithBooking>,
}

/// Request for availability creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAvailabilityRequest {
    pub date: NaiveDate,
    /// Format: "HH:mm"
    pub start_time: String,
    /// Format: "HH:mm"
    pub end_time: String,
    pub is_recurring: Option<bool>,
    /// 0-6 for Sunday-Saturday
    pub day_of_week: Option<i16>,
}

/// Partial update of an availability
///
/// Every absent field keeps the stored value; see [`AvailabilityPatch::apply`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPatch {
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_recurring: Option<bool>,
    pub day_of_week: Option<i16>,
}

impl AvailabilityPatch {
    /// Merge the present fields over `current`
    pub fn apply(&self, current: Availability) -> Availability {
        Availability {
            date: self.date.unwrap_or(current.date),
            start_time: self.start_time.clone().unwrap_or(current.start_time),
            end_time: self.end_time.clone().unwrap_or(current.end_time),
            is_recurring: self.is_recurring.unwrap_or(current.is_recurring),
            day_of_week: self.day_of_week.or(current.day_of_week),
            ..current
        }
    }
}
