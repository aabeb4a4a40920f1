//! Conflict detection over active bookings.
//!
//! A booking counts toward occupancy while its status is reserved, confirmed,
//! or checked-in. Interval math is half-open on calendar days, so back-to-back
//! checkout/check-in on the same day is never a conflict.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::booking::{Booking, BookingStatus, StayRange};
use crate::domain::ports::{BookingStore, GuestStore};
use crate::error::Result;

/// One party of a detected overlap, with the guest name resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictingStay {
    pub booking_id: String,
    pub guest_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
}

/// All overlapping active bookings found on one room.
#[derive(Debug, Clone, Serialize)]
pub struct RoomConflicts {
    pub room_id: String,
    pub room_number: String,
    pub stays: Vec<ConflictingStay>,
}

/// Filters `rows` down to active bookings overlapping `stay`, skipping
/// `exclude` (the booking being rewritten, e.g. during a stay extension).
pub fn active_overlapping(
    rows: &[Booking],
    stay: StayRange,
    exclude: Option<&str>,
) -> Vec<Booking> {
    rows.iter()
        .filter(|b| b.is_active())
        .filter(|b| exclude != Some(b.id.as_str()))
        .filter(|b| b.stay().overlaps(&stay))
        .cloned()
        .collect()
}

/// Pre-check gate used before booking creation and stay extension.
pub async fn has_overlap(
    bookings: &dyn BookingStore,
    room_id: &str,
    stay: StayRange,
    exclude: Option<&str>,
) -> Result<bool> {
    let rows = bookings.for_room(room_id).await?;
    Ok(!active_overlapping(&rows, stay, exclude).is_empty())
}

/// Query form: the conflicting bookings with their guest names, for error
/// detail and the conflicts view.
pub async fn conflicts_for(
    bookings: &dyn BookingStore,
    guests: &dyn GuestStore,
    room_id: &str,
    stay: StayRange,
    exclude: Option<&str>,
) -> Result<Vec<ConflictingStay>> {
    let rows = bookings.for_room(room_id).await?;
    let mut out = Vec::new();
    for booking in active_overlapping(&rows, stay, exclude) {
        let guest_name = match guests.get(&booking.guest_id).await? {
            Some(guest) => guest.name,
            None => booking.guest_id.clone(),
        };
        out.push(ConflictingStay {
            booking_id: booking.id,
            guest_name,
            check_in: booking.check_in,
            check_out: booking.check_out,
            status: booking.status,
        });
    }
    Ok(out)
}

/// Scans one room's bookings for mutually overlapping active stays. Returns
/// the overlapping set (empty when the invariant holds).
pub fn overlapping_set(rows: &[Booking]) -> Vec<&Booking> {
    let mut active: Vec<&Booking> = rows.iter().filter(|b| b.is_active()).collect();
    active.sort_by_key(|b| b.check_in);

    let mut conflicted: Vec<&Booking> = Vec::new();
    for i in 0..active.len() {
        for j in (i + 1)..active.len() {
            if !active[i].stay().overlaps(&active[j].stay()) {
                // Sorted by check-in, so nothing later overlaps i either.
                break;
            }
            for b in [active[i], active[j]] {
                if !conflicted.iter().any(|c| c.id == b.id) {
                    conflicted.push(b);
                }
            }
        }
    }
    conflicted.sort_by(|a, b| (a.check_in, &a.id).cmp(&(b.check_in, &b.id)));
    conflicted
}
