//! In-memory store used by service and router tests
//!
//! A single mutex guards all tables, so every trait method is one atomic
//! step. Writes check the same preconditions as the SQL statements (slot
//! still `OPEN`, booking still in its prior status, no booking referencing a
//! deleted slot) before mutating anything.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::error::{DatabaseError, DatabaseResult};
use std::{collections::HashMap, sync::Mutex};
use uuid::Uuid;

use super::{AvailabilityStore, BookingStore, WorkoutStore};
use crate::models::{
    UserSummary,
    availability::{Availability, AvailabilityWithSlots, NewAvailability},
    booking::{Booking, BookingDetails, BookingStatus, BookingUpdate, NewBooking},
    slot::{NewSlot, Slot, SlotBooking, SlotDetails, SlotStatus, SlotWithBooking},
    workout::{Exercise, NewExercise, NewWorkoutPlan, WorkoutPlan},
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserSummary>,
    availabilities: HashMap<Uuid, Availability>,
    slots: HashMap<Uuid, Slot>,
    /// Insertion order is kept for stable listings
    bookings: Vec<Booking>,
    plans: HashMap<Uuid, WorkoutPlan>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().users.insert(
            id,
            UserSummary {
                id,
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                avatar_url: None,
            },
        );
        id
    }

    /// Insert a one-hour open slot starting at `start`, with a parent availability
    pub fn add_slot(&self, owner_id: Uuid, start: DateTime<Utc>) -> Uuid {
        let now = Utc::now();
        let availability = Availability {
            id: Uuid::new_v4(),
            owner_id,
            date: start.date_naive(),
            start_time: start.format("%H:%M").to_string(),
            end_time: (start + Duration::hours(1)).format("%H:%M").to_string(),
            is_recurring: false,
            day_of_week: None,
            created_at: now,
            updated_at: now,
        };
        let slot = Slot {
            id: Uuid::new_v4(),
            availability_id: availability.id,
            owner_id,
            start_time: start,
            end_time: start + Duration::hours(1),
            status: SlotStatus::Open,
            created_at: now,
            updated_at: now,
        };
        let slot_id = slot.id;

        let mut tables = self.lock();
        tables.availabilities.insert(availability.id, availability);
        tables.slots.insert(slot_id, slot);
        slot_id
    }

    pub fn slot_status(&self, slot_id: Uuid) -> Option<SlotStatus> {
        self.lock().slots.get(&slot_id).map(|s| s.status)
    }

    pub fn booking_count(&self) -> usize {
        self.lock().bookings.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A poisoned lock only happens after a panicking test
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Tables {
    fn user(&self, id: Uuid) -> UserSummary {
        self.users.get(&id).cloned().unwrap_or(UserSummary {
            id,
            name: String::new(),
            email: String::new(),
            avatar_url: None,
        })
    }

    fn active_booking(&self, slot_id: Uuid) -> Option<&Booking> {
        self.bookings
            .iter()
            .find(|b| b.slot_id == slot_id && b.status != BookingStatus::Cancelled)
    }

    fn slot_with_booking(&self, slot: &Slot) -> SlotWithBooking {
        SlotWithBooking {
            slot: slot.clone(),
            booking: self.active_booking(slot.id).map(|b| SlotBooking {
                id: b.id,
                client_id: b.client_id,
                notes: b.notes.clone(),
                status: b.status,
                created_at: b.created_at,
                client: self.user(b.client_id),
            }),
        }
    }

    fn slots_of(&self, availability_id: Uuid) -> Vec<SlotWithBooking> {
        let mut slots: Vec<&Slot> = self
            .slots
            .values()
            .filter(|s| s.availability_id == availability_id)
            .collect();
        slots.sort_by_key(|s| s.start_time);
        slots.into_iter().map(|s| self.slot_with_booking(s)).collect()
    }

    fn slot_details(&self, slot: &Slot) -> Option<SlotDetails> {
        Some(SlotDetails {
            slot: slot.clone(),
            trainer: self.user(slot.owner_id),
            availability: self.availabilities.get(&slot.availability_id)?.clone(),
        })
    }

    fn booking_details(&self, booking: &Booking) -> Option<BookingDetails> {
        let slot = self.slots.get(&booking.slot_id)?;
        Some(BookingDetails {
            booking: booking.clone(),
            slot: self.slot_details(slot)?,
            client: self.user(booking.client_id),
        })
    }
}

#[async_trait]
impl AvailabilityStore for MemoryStore {
    async fn create(&self, availability: &NewAvailability, slots: &[NewSlot]) -> DatabaseResult<()> {
        let now = Utc::now();
        let mut tables = self.lock();

        tables.availabilities.insert(
            availability.id,
            Availability {
                id: availability.id,
                owner_id: availability.owner_id,
                date: availability.date,
                start_time: availability.start_time.clone(),
                end_time: availability.end_time.clone(),
                is_recurring: availability.is_recurring,
                day_of_week: availability.day_of_week,
                created_at: now,
                updated_at: now,
            },
        );

        for slot in slots {
            let id = Uuid::new_v4();
            tables.slots.insert(
                id,
                Slot {
                    id,
                    availability_id: slot.availability_id,
                    owner_id: slot.owner_id,
                    start_time: slot.start_time,
                    end_time: slot.end_time,
                    status: SlotStatus::Open,
                    created_at: now,
                    updated_at: now,
                },
            );
        }

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Availability>> {
        Ok(self.lock().availabilities.get(&id).cloned())
    }

    async fn find_with_slots(&self, id: Uuid) -> DatabaseResult<Option<AvailabilityWithSlots>> {
        let tables = self.lock();
        Ok(tables.availabilities.get(&id).map(|a| AvailabilityWithSlots {
            availability: a.clone(),
            slots: tables.slots_of(a.id),
        }))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> DatabaseResult<Vec<AvailabilityWithSlots>> {
        let tables = self.lock();
        let mut owned: Vec<&Availability> = tables
            .availabilities
            .values()
            .filter(|a| a.owner_id == owner_id)
            .collect();
        owned.sort_by(|a, b| (a.date, &a.start_time).cmp(&(b.date, &b.start_time)));

        Ok(owned
            .into_iter()
            .map(|a| AvailabilityWithSlots {
                availability: a.clone(),
                slots: tables.slots_of(a.id),
            })
            .collect())
    }

    async fn save(&self, availability: &Availability) -> DatabaseResult<()> {
        let mut tables = self.lock();
        let stored = tables
            .availabilities
            .get_mut(&availability.id)
            .ok_or(DatabaseError::NotFound)?;

        *stored = Availability {
            updated_at: Utc::now(),
            ..availability.clone()
        };
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        let mut tables = self.lock();
        if !tables.availabilities.contains_key(&id) {
            return Err(DatabaseError::NotFound);
        }

        let referenced = tables.bookings.iter().any(|b| {
            tables
                .slots
                .get(&b.slot_id)
                .is_some_and(|s| s.availability_id == id)
        });
        if referenced {
            return Err(DatabaseError::Conflict(
                "Availability has booked slots".to_string(),
            ));
        }

        tables.availabilities.remove(&id);
        tables.slots.retain(|_, s| s.availability_id != id);
        Ok(())
    }

    async fn open_slots(
        &self,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> DatabaseResult<Vec<SlotDetails>> {
        let tables = self.lock();
        let mut open: Vec<&Slot> = tables
            .slots
            .values()
            .filter(|s| s.status == SlotStatus::Open)
            .filter(|s| s.start_time >= from && until.is_none_or(|u| s.start_time <= u))
            .collect();
        open.sort_by_key(|s| s.start_time);

        Ok(open.into_iter().filter_map(|s| tables.slot_details(s)).collect())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn find_slot(&self, slot_id: Uuid) -> DatabaseResult<Option<SlotWithBooking>> {
        let tables = self.lock();
        Ok(tables.slots.get(&slot_id).map(|s| tables.slot_with_booking(s)))
    }

    async fn create(&self, booking: &NewBooking) -> DatabaseResult<()> {
        let mut tables = self.lock();

        let claimable = tables
            .slots
            .get(&booking.slot_id)
            .is_some_and(|s| s.status == SlotStatus::Open);
        if !claimable || tables.active_booking(booking.slot_id).is_some() {
            return Err(DatabaseError::Conflict(
                "Slot is not available for booking".to_string(),
            ));
        }

        let now = Utc::now();
        if let Some(slot) = tables.slots.get_mut(&booking.slot_id) {
            slot.status = SlotStatus::Booked;
            slot.updated_at = now;
        }
        tables.bookings.push(Booking {
            id: booking.id,
            slot_id: booking.slot_id,
            client_id: booking.client_id,
            notes: booking.notes.clone(),
            status: BookingStatus::Confirmed,
            created_at: now,
            updated_at: now,
        });

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<BookingDetails>> {
        let tables = self.lock();
        Ok(tables
            .bookings
            .iter()
            .find(|b| b.id == id)
            .and_then(|b| tables.booking_details(b)))
    }

    async fn apply_update(&self, update: &BookingUpdate) -> DatabaseResult<()> {
        let mut tables = self.lock();
        let now = Utc::now();

        let index = tables
            .bookings
            .iter()
            .position(|b| b.id == update.booking_id)
            .ok_or(DatabaseError::NotFound)?;

        if let Some(change) = update.status {
            if tables.bookings[index].status != change.from {
                return Err(DatabaseError::Conflict(
                    "Booking was modified concurrently".to_string(),
                ));
            }

            tables.bookings[index].status = change.to.booking;
            if let Some(slot) = tables.slots.get_mut(&update.slot_id) {
                slot.status = change.to.slot;
                slot.updated_at = now;
            }
        }

        let booking = &mut tables.bookings[index];
        if let Some(notes) = &update.notes {
            booking.notes = Some(notes.clone());
        }
        booking.updated_at = now;

        Ok(())
    }

    async fn list_for_client(&self, client_id: Uuid) -> DatabaseResult<Vec<BookingDetails>> {
        let tables = self.lock();
        let mut details: Vec<BookingDetails> = tables
            .bookings
            .iter()
            .rev()
            .filter(|b| b.client_id == client_id)
            .filter_map(|b| tables.booking_details(b))
            .collect();
        details.sort_by(|a, b| b.booking.created_at.cmp(&a.booking.created_at));
        Ok(details)
    }

    async fn list_for_trainer(&self, trainer_id: Uuid) -> DatabaseResult<Vec<BookingDetails>> {
        let tables = self.lock();
        let mut details: Vec<BookingDetails> = tables
            .bookings
            .iter()
            .filter_map(|b| tables.booking_details(b))
            .filter(|d| d.trainer_id() == trainer_id)
            .collect();
        details.sort_by_key(|d| d.slot.slot.start_time);
        Ok(details)
    }
}

fn to_exercises(plan_id: Uuid, exercises: &[NewExercise]) -> Vec<Exercise> {
    let mut stored: Vec<Exercise> = exercises
        .iter()
        .map(|e| Exercise {
            id: Uuid::new_v4(),
            workout_plan_id: plan_id,
            name: e.name.clone(),
            sets: e.sets,
            reps: e.reps,
            notes: e.notes.clone(),
            order: e.order,
        })
        .collect();
    stored.sort_by_key(|e| e.order);
    stored
}

#[async_trait]
impl WorkoutStore for MemoryStore {
    async fn create(&self, plan: &NewWorkoutPlan, exercises: &[NewExercise]) -> DatabaseResult<()> {
        let now = Utc::now();
        self.lock().plans.insert(
            plan.id,
            WorkoutPlan {
                id: plan.id,
                owner_id: plan.owner_id,
                name: plan.name.clone(),
                description: plan.description.clone(),
                duration: plan.duration,
                created_at: now,
                updated_at: now,
                exercises: to_exercises(plan.id, exercises),
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<WorkoutPlan>> {
        Ok(self.lock().plans.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> DatabaseResult<Vec<WorkoutPlan>> {
        let mut plans: Vec<WorkoutPlan> = self
            .lock()
            .plans
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    async fn update(&self, plan: &WorkoutPlan, exercises: Option<&[NewExercise]>) -> DatabaseResult<()> {
        let mut tables = self.lock();
        let stored = tables.plans.get_mut(&plan.id).ok_or(DatabaseError::NotFound)?;

        stored.name = plan.name.clone();
        stored.description = plan.description.clone();
        stored.duration = plan.duration;
        stored.updated_at = Utc::now();
        if let Some(exercises) = exercises {
            stored.exercises = to_exercises(plan.id, exercises);
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        self.lock()
            .plans
            .remove(&id)
            .map(|_| ())
            .ok_or(DatabaseError::NotFound)
    }
}
