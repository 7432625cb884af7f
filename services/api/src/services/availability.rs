//! Availability Engine: trainer time windows and the slots generated from them

use chrono::{FixedOffset, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        availability::{
            Availability, AvailabilityPatch, AvailabilityWithSlots, CreateAvailabilityRequest,
            NewAvailability,
        },
        slot::SlotDetails,
    },
    repositories::AvailabilityStore,
    schedule::{TimeWindow, day_bounds, generate_slots, validate_day_of_week},
};

#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn AvailabilityStore>,
    offset: FixedOffset,
}

impl AvailabilityService {
    /// `offset` is the UTC offset of the wall-clock times trainers submit
    pub fn new(store: Arc<dyn AvailabilityStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    /// Validate the window, persist the availability and its generated slots
    pub async fn create(
        &self,
        owner_id: Uuid,
        request: CreateAvailabilityRequest,
    ) -> ApiResult<AvailabilityWithSlots> {
        let window = TimeWindow::parse(&request.start_time, &request.end_time)?;
        validate_day_of_week(request.day_of_week)?;

        let availability = NewAvailability {
            id: Uuid::new_v4(),
            owner_id,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            is_recurring: request.is_recurring.unwrap_or(false),
            day_of_week: request.day_of_week,
        };
        let slots = generate_slots(availability.id, owner_id, availability.date, window, self.offset);

        self.store.create(&availability, &slots).await?;
        info!(
            "Availability {} created for trainer {} with {} slots",
            availability.id,
            owner_id,
            slots.len()
        );

        self.store
            .find_with_slots(availability.id)
            .await?
            .ok_or_else(|| {
                error!("Availability {} vanished after creation", availability.id);
                ApiError::InternalServerError
            })
    }

    pub async fn list(&self, owner_id: Uuid) -> ApiResult<Vec<AvailabilityWithSlots>> {
        Ok(self.store.list_by_owner(owner_id).await?)
    }

    pub async fn get(&self, caller_id: Uuid, id: Uuid) -> ApiResult<AvailabilityWithSlots> {
        self.owned(caller_id, id).await?;
        self.store
            .find_with_slots(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Availability"))
    }

    /// Apply a patch. Times are re-validated only when both are supplied and
    /// existing slots are never regenerated.
    pub async fn update(
        &self,
        caller_id: Uuid,
        id: Uuid,
        patch: AvailabilityPatch,
    ) -> ApiResult<AvailabilityWithSlots> {
        let current = self.owned(caller_id, id).await?;

        if let (Some(start), Some(end)) = (&patch.start_time, &patch.end_time) {
            TimeWindow::parse(start, end)?;
        }
        validate_day_of_week(patch.day_of_week)?;

        self.store.save(&patch.apply(current)).await?;
        info!("Availability {} updated", id);

        self.get(caller_id, id).await
    }

    pub async fn delete(&self, caller_id: Uuid, id: Uuid) -> ApiResult<()> {
        self.owned(caller_id, id).await?;
        self.store.delete(id).await?;
        info!("Availability {} deleted", id);
        Ok(())
    }

    /// Open slots on the given local day, or from now on when no day is given
    pub async fn open_slots(&self, date: Option<NaiveDate>) -> ApiResult<Vec<SlotDetails>> {
        let (from, until) = match date {
            Some(date) => {
                let (start, end) = day_bounds(date, self.offset);
                (start, Some(end))
            }
            None => (Utc::now(), None),
        };

        Ok(self.store.open_slots(from, until).await?)
    }

    async fn owned(&self, caller_id: Uuid, id: Uuid) -> ApiResult<Availability> {
        let availability = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Availability"))?;

        if availability.owner_id != caller_id {
            return Err(ApiError::forbidden(
                "You do not have permission to access this availability",
            ));
        }

        Ok(availability)
    }
}
