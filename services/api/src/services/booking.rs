//! Booking Engine: claiming, updating and cancelling slots

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::booking::{
        BookingDetails, BookingStatus, BookingUpdate, CreateBookingRequest, NewBooking,
        StatusChange, UpdateBookingRequest,
    },
    repositories::BookingStore,
    transition::transition_slot_booking,
};

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Book an open, upcoming slot for `client_id`
    ///
    /// Checks run in order: the slot exists, it can move to `CONFIRMED`, it
    /// has not started yet. The store then claims the slot atomically, so a
    /// concurrent winner still surfaces here as a conflict.
    pub async fn create(&self, client_id: Uuid, request: CreateBookingRequest) -> ApiResult<BookingDetails> {
        let slot = self
            .store
            .find_slot(request.slot_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Slot"))?;

        transition_slot_booking(
            slot.slot.status,
            slot.booking.as_ref().map(|b| b.status),
            BookingStatus::Confirmed,
        )?;

        if slot.slot.start_time < Utc::now() {
            return Err(ApiError::InvalidInput(
                "Cannot book a slot in the past".to_string(),
            ));
        }

        let booking = NewBooking {
            id: Uuid::new_v4(),
            slot_id: request.slot_id,
            client_id,
            notes: request.notes,
        };
        self.store.create(&booking).await?;
        info!(
            "Booking {} created by client {} for slot {}",
            booking.id, client_id, booking.slot_id
        );

        self.store.find_by_id(booking.id).await?.ok_or_else(|| {
            error!("Booking {} vanished after creation", booking.id);
            ApiError::InternalServerError
        })
    }

    /// Visible to the booking's client and to the trainer owning the slot
    pub async fn get(&self, caller_id: Uuid, id: Uuid) -> ApiResult<BookingDetails> {
        let details = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Booking"))?;

        if caller_id != details.booking.client_id && caller_id != details.trainer_id() {
            return Err(ApiError::forbidden(
                "You do not have permission to access this booking",
            ));
        }

        Ok(details)
    }

    /// Cancel and reopen the slot. Only a `CONFIRMED` booking can be cancelled.
    pub async fn cancel(&self, caller_id: Uuid, id: Uuid) -> ApiResult<()> {
        let details = self.client_owned(caller_id, id).await?;

        let to = transition_slot_booking(
            details.slot.slot.status,
            Some(details.booking.status),
            BookingStatus::Cancelled,
        )?;

        self.store
            .apply_update(&BookingUpdate {
                booking_id: id,
                slot_id: details.booking.slot_id,
                notes: None,
                status: Some(StatusChange {
                    from: details.booking.status,
                    to,
                }),
            })
            .await?;
        info!("Booking {} cancelled, slot {} reopened", id, details.booking.slot_id);

        Ok(())
    }

    /// Update notes and/or status; requesting the current status changes nothing
    pub async fn update(
        &self,
        caller_id: Uuid,
        id: Uuid,
        request: UpdateBookingRequest,
    ) -> ApiResult<BookingDetails> {
        let details = self.client_owned(caller_id, id).await?;
        let current = details.booking.status;

        let status = match request.status {
            Some(target) if target != current => Some(StatusChange {
                from: current,
                to: transition_slot_booking(details.slot.slot.status, Some(current), target)?,
            }),
            _ => None,
        };

        if request.notes.is_none() && status.is_none() {
            return Ok(details);
        }

        self.store
            .apply_update(&BookingUpdate {
                booking_id: id,
                slot_id: details.booking.slot_id,
                notes: request.notes,
                status,
            })
            .await?;
        info!("Booking {} updated", id);

        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Booking"))
    }

    /// The client's bookings, newest first
    pub async fn list_for_client(&self, client_id: Uuid) -> ApiResult<Vec<BookingDetails>> {
        Ok(self.store.list_for_client(client_id).await?)
    }

    /// Bookings on the trainer's slots, earliest slot first
    pub async fn list_for_trainer(&self, trainer_id: Uuid) -> ApiResult<Vec<BookingDetails>> {
        Ok(self.store.list_for_trainer(trainer_id).await?)
    }

    async fn client_owned(&self, caller_id: Uuid, id: Uuid) -> ApiResult<BookingDetails> {
        let details = self.get(caller_id, id).await?;

        if details.booking.client_id != caller_id {
            return Err(ApiError::forbidden(
                "Only the client who made the booking can modify it",
            ));
        }

        Ok(details)
    }
}
