//! End-of-day operational report.
//!
//! A pure fold over the day's records: who is due to arrive, who is due to
//! leave and with what balance, who sleeps in the house tonight, plus the
//! room-status census and the open housekeeping backlog.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::booking::{Booking, BookingSource, BookingStatus, Money};
use crate::domain::guest::Guest;
use crate::domain::room::{Room, RoomStatus};

/// One booking as it appears on the report.
#[derive(Debug, Clone, Serialize)]
pub struct StayLine {
    pub booking_id: String,
    pub guest_name: String,
    pub room_number: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
    pub balance_due: Money,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoomCensus {
    pub available: usize,
    pub occupied: usize,
    pub cleaning: usize,
    pub maintenance: usize,
}

#[derive(Debug, Serialize)]
pub struct EndOfDayReport {
    pub date: NaiveDate,
    pub arrivals: Vec<StayLine>,
    pub departures: Vec<StayLine>,
    pub in_house: Vec<StayLine>,
    pub rooms: RoomCensus,
    pub open_housekeeping_tasks: usize,
}

/// Builds the report for `date` from a consistent read of the stores.
///
/// Arrivals are active bookings not yet checked in whose stay starts on
/// `date`; departures are checked-in bookings whose stay ends on `date`;
/// in-house is everyone checked in whose stay covers the night of `date`.
pub fn build(
    date: NaiveDate,
    bookings: &[Booking],
    guests: &HashMap<String, Guest>,
    rooms: &HashMap<String, Room>,
    open_housekeeping_tasks: usize,
) -> EndOfDayReport {
    let line = |b: &Booking| -> StayLine {
        StayLine {
            booking_id: b.id.clone(),
            guest_name: guests
                .get(&b.guest_id)
                .map(|g| g.name.clone())
                .unwrap_or_else(|| b.guest_id.clone()),
            room_number: rooms
                .get(&b.room_id)
                .map(|r| r.number.clone())
                .unwrap_or_else(|| b.room_id.clone()),
            check_in: b.check_in,
            check_out: b.check_out,
            status: b.status,
            balance_due: b.balance_due(),
        }
    };

    let mut arrivals: Vec<StayLine> = bookings
        .iter()
        .filter(|b| {
            matches!(b.status, BookingStatus::Reserved | BookingStatus::Confirmed)
                && b.check_in == date
        })
        .map(line)
        .collect();
    let mut departures: Vec<StayLine> = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::CheckedIn && b.check_out == date)
        .map(line)
        .collect();
    let mut in_house: Vec<StayLine> = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::CheckedIn && b.stay().covers(date))
        .map(line)
        .collect();

    let by_room = |a: &StayLine, b: &StayLine| {
        a.room_number
            .cmp(&b.room_number)
            .then_with(|| a.booking_id.cmp(&b.booking_id))
    };
    arrivals.sort_by(by_room);
    departures.sort_by(by_room);
    in_house.sort_by(by_room);

    let mut census = RoomCensus::default();
    for room in rooms.values() {
        match room.status {
            RoomStatus::Available => census.available += 1,
            RoomStatus::Occupied => census.occupied += 1,
            RoomStatus::Cleaning => census.cleaning += 1,
            RoomStatus::Maintenance => census.maintenance += 1,
        }
    }

    EndOfDayReport {
        date,
        arrivals,
        departures,
        in_house,
        rooms: census,
        open_housekeeping_tasks,
    }
}

/// One row of the canonical booking ledger the CLI prints.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub room: String,
    pub guest: String,
    pub email: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub guests: u32,
    pub status: BookingStatus,
    pub total_price: Money,
    pub balance_due: Money,
    pub source: BookingSource,
    pub group_reference: String,
}

/// Joins bookings with guest and room records into ledger rows. Unknown ids
/// degrade to the raw id so a half-migrated store still prints.
pub fn ledger(
    bookings: &[Booking],
    guests: &HashMap<String, Guest>,
    rooms: &HashMap<String, Room>,
) -> Vec<LedgerEntry> {
    bookings
        .iter()
        .map(|b| LedgerEntry {
            room: rooms
                .get(&b.room_id)
                .map(|r| r.number.clone())
                .unwrap_or_else(|| b.room_id.clone()),
            guest: guests
                .get(&b.guest_id)
                .map(|g| g.name.clone())
                .unwrap_or_else(|| b.guest_id.clone()),
            email: guests
                .get(&b.guest_id)
                .map(|g| g.email.clone())
                .unwrap_or_default(),
            check_in: b.check_in,
            check_out: b.check_out,
            nights: b.stay().nights(),
            guests: b.num_guests,
            status: b.status,
            total_price: b.total_price,
            balance_due: b.balance_due(),
            source: b.source,
            group_reference: b
                .group
                .as_ref()
                .map(|g| g.reference.clone())
                .unwrap_or_default(),
        })
        .collect()
}
