//! Booking lifecycle state machine.
//!
//! The transition table is the single authority on legal moves. Everything
//! else here is the bookkeeping a move implies: actor/time stamps on the
//! booking and the room status the move forces.

use chrono::{DateTime, Utc};

use crate::domain::actor::Actor;
use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::room::RoomStatus;
use crate::error::{BookingError, Result};

/// Legal lifecycle moves. Terminal states admit nothing.
pub fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;
    matches!(
        (from, to),
        (Reserved, Confirmed | CheckedIn | Cancelled)
            | (Confirmed, CheckedIn | Cancelled)
            | (CheckedIn, CheckedOut | Cancelled)
    )
}

/// Validates a requested move against the table. An illegal move to
/// `CheckedOut` gets its own error so front desks see "not checked in"
/// instead of a generic transition failure.
pub fn check_transition(booking: &Booking, to: BookingStatus) -> Result<()> {
    if can_transition(booking.status, to) {
        return Ok(());
    }
    if to == BookingStatus::CheckedOut {
        return Err(BookingError::CannotCheckOut(booking.id.clone()));
    }
    Err(BookingError::InvalidTransition {
        from: booking.status,
        to,
    })
}

/// Applies a validated move in place, stamping who did it and when.
pub fn advance(
    booking: &mut Booking,
    to: BookingStatus,
    actor: &Actor,
    at: DateTime<Utc>,
) -> Result<()> {
    check_transition(booking, to)?;
    match to {
        BookingStatus::CheckedIn => {
            booking.checked_in_by = Some(actor.name.clone());
            booking.actual_check_in = Some(at);
        }
        BookingStatus::CheckedOut => {
            booking.checked_out_by = Some(actor.name.clone());
            booking.actual_check_out = Some(at);
        }
        _ => {}
    }
    booking.status = to;
    Ok(())
}

/// Room status a move forces, if any. Cancelling only frees the room when
/// this booking had the guest physically in it.
pub fn room_status_after(from: BookingStatus, to: BookingStatus) -> Option<RoomStatus> {
    match to {
        BookingStatus::CheckedIn => Some(RoomStatus::Occupied),
        BookingStatus::CheckedOut => Some(RoomStatus::Cleaning),
        BookingStatus::Cancelled if from == BookingStatus::CheckedIn => Some(RoomStatus::Available),
        _ => None,
    }
}
