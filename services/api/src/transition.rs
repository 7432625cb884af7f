//! Slot/booking state transitions
//!
//! A booking status change and the matching slot status change are decided
//! here, without touching storage. Repositories then apply the returned
//! [`Transition`] inside one transaction, guarded by compare-and-set on the
//! prior status so concurrent callers cannot both win.

use thiserror::Error;

use crate::models::{booking::BookingStatus, slot::SlotStatus};

/// Target state of a booking and its slot after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub booking: BookingStatus,
    pub slot: SlotStatus,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Slot is not available for booking")]
    SlotUnavailable,

    #[error("Slot is already booked")]
    AlreadyBooked,

    #[error("Booking is already {0:?}")]
    Finalized(BookingStatus),

    #[error("There is no booking to move to {0:?}")]
    NoBooking(BookingStatus),
}

/// Decide the next slot/booking state
///
/// `booking` is the slot's current active booking, `None` when the slot has
/// none. Rules:
///
/// * no booking, slot `OPEN` → `CONFIRMED` books the slot
/// * `CONFIRMED` → `CANCELLED` reopens the slot
/// * `CONFIRMED` → `COMPLETED` keeps the slot booked
/// * `CANCELLED` and `COMPLETED` are final
pub fn transition_slot_booking(
    slot: SlotStatus,
    booking: Option<BookingStatus>,
    to: BookingStatus,
) -> Result<Transition, TransitionError> {
    use crate::models::booking::BookingStatus::*;

    match (booking, to) {
        (None, Confirmed) if slot == SlotStatus::Open => Ok(Transition {
            booking: Confirmed,
            slot: SlotStatus::Booked,
        }),
        (None, Confirmed) => Err(TransitionError::SlotUnavailable),
        (None, target) => Err(TransitionError::NoBooking(target)),
        (Some(Confirmed), Confirmed) => Err(TransitionError::AlreadyBooked),
        (Some(Confirmed), Cancelled) => Ok(Transition {
            booking: Cancelled,
            slot: SlotStatus::Open,
        }),
        (Some(Confirmed), Completed) => Ok(Transition {
            booking: Completed,
            slot: SlotStatus::Booked,
        }),
        (Some(current), _) => Err(TransitionError::Finalized(current)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::BookingStatus::*;

    #[test]
    fn open_slot_can_be_booked() {
        assert_eq!(
            transition_slot_booking(SlotStatus::Open, None, Confirmed),
            Ok(Transition {
                booking: Confirmed,
                slot: SlotStatus::Booked
            })
        );
    }

    #[test]
    fn booked_slot_cannot_be_booked_again() {
        assert_eq!(
            transition_slot_booking(SlotStatus::Booked, None, Confirmed),
            Err(TransitionError::SlotUnavailable)
        );
        assert_eq!(
            transition_slot_booking(SlotStatus::Booked, Some(Confirmed), Confirmed),
            Err(TransitionError::AlreadyBooked)
        );
    }

    #[test]
    fn existing_booking_blocks_even_if_slot_reads_open() {
        assert_eq!(
            transition_slot_booking(SlotStatus::Open, Some(Confirmed), Confirmed),
            Err(TransitionError::AlreadyBooked)
        );
    }

    #[test]
    fn cancellation_reopens_the_slot() {
        assert_eq!(
            transition_slot_booking(SlotStatus::Booked, Some(Confirmed), Cancelled),
            Ok(Transition {
                booking: Cancelled,
                slot: SlotStatus::Open
            })
        );
    }

    #[test]
    fn completion_keeps_the_slot_booked() {
        assert_eq!(
            transition_slot_booking(SlotStatus::Booked, Some(Confirmed), Completed)
                .map(|t| t.slot),
            Ok(SlotStatus::Booked)
        );
    }

    #[test]
    fn final_states_do_not_move() {
        for current in [Cancelled, Completed] {
            for target in [Confirmed, Cancelled, Completed] {
                assert_eq!(
                    transition_slot_booking(SlotStatus::Open, Some(current), target),
                    Err(TransitionError::Finalized(current))
                );
            }
        }
    }

    #[test]
    fn nothing_to_cancel_without_a_booking() {
        assert_eq!(
            transition_slot_booking(SlotStatus::Open, None, Cancelled),
            Err(TransitionError::NoBooking(Cancelled))
        );
    }
}
