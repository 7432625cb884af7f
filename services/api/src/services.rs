//! Business operations behind the HTTP handlers
//!
//! Every service re-reads current state from its store before acting and
//! performs ownership checks against the resolved principal id.

pub mod availability;
pub mod booking;
pub mod workout;

pub use availability::AvailabilityService;
pub use booking::BookingService;
pub use workout::WorkoutService;
