//! Application state shared across handlers

use chrono::FixedOffset;
use common::token::JwtService;
use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    repositories::{AvailabilityRepository, BookingRepository, WorkoutRepository},
    services::{AvailabilityService, BookingService, WorkoutService},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub availability: AvailabilityService,
    pub bookings: BookingService,
    pub workouts: WorkoutService,
    pub jwt: JwtService,
}

impl AppState {
    /// Wire the Postgres repositories into the services
    pub fn new(pool: PgPool, jwt: JwtService, schedule_offset: FixedOffset) -> Self {
        Self {
            availability: AvailabilityService::new(
                Arc::new(AvailabilityRepository::new(pool.clone())),
                schedule_offset,
            ),
            bookings: BookingService::new(Arc::new(BookingRepository::new(pool.clone()))),
            workouts: WorkoutService::new(Arc::new(WorkoutRepository::new(pool))),
            jwt,
        }
    }
}
