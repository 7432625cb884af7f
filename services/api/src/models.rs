//! API models for request and response payloads

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod availability;
pub mod booking;
pub mod slot;
pub mod workout;

/// Public projection of a user embedded in joined views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// Plain acknowledgement returned by delete/cancel endpoints
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
