//! Canonicalization of duplicate bookings.
//!
//! Replayed feeds and racing channels can record the same stay more than
//! once, sometimes under guest records that were later unified. Duplicates
//! are keyed by natural identity (normalized guest email and room number),
//! not by record id, so bookings split across aliased guest rows still
//! collapse. The survivor is the row that progressed furthest through the
//! lifecycle; a checked-in record always beats a lingering reservation for
//! the same stay.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::booking::Booking;

#[derive(Debug, Default)]
pub struct DedupOutcome {
    pub kept: Vec<Booking>,
    pub removed: Vec<Booking>,
}

impl DedupOutcome {
    pub fn removed_ids(&self) -> Vec<&str> {
        self.removed.iter().map(|b| b.id.as_str()).collect()
    }
}

/// Splits `rows` into survivors and duplicates.
///
/// `guest_emails` maps guest id to normalized email and `room_numbers` maps
/// room id to number; a guest without an email keys by guest id instead so
/// distinct walk-ins never collapse into each other. Survivors keep the
/// highest lifecycle rank in their duplicate set; rank ties break toward the
/// lexically smallest id so repeated passes are deterministic. `kept` comes
/// back sorted by (check-in, room number, id).
pub fn canonical_bookings(
    rows: Vec<Booking>,
    guest_emails: &HashMap<String, String>,
    room_numbers: &HashMap<String, String>,
) -> DedupOutcome {
    let guest_key = |b: &Booking| -> String {
        match guest_emails.get(&b.guest_id) {
            Some(email) if !email.is_empty() => email.clone(),
            _ => b.guest_id.clone(),
        }
    };
    let room_key = |b: &Booking| -> String {
        room_numbers
            .get(&b.room_id)
            .cloned()
            .unwrap_or_else(|| b.room_id.clone())
    };

    let mut groups: HashMap<(String, String, NaiveDate, NaiveDate), Vec<Booking>> = HashMap::new();
    for booking in rows {
        let key = (
            guest_key(&booking),
            room_key(&booking),
            booking.check_in,
            booking.check_out,
        );
        groups.entry(key).or_default().push(booking);
    }

    let mut outcome = DedupOutcome::default();
    for (_, mut dupes) in groups {
        dupes.sort_by(|a, b| {
            b.status
                .lifecycle_rank()
                .cmp(&a.status.lifecycle_rank())
                .then_with(|| a.id.cmp(&b.id))
        });
        let mut dupes = dupes.into_iter();
        if let Some(survivor) = dupes.next() {
            outcome.kept.push(survivor);
        }
        outcome.removed.extend(dupes);
    }

    outcome.kept.sort_by(|a, b| {
        a.check_in
            .cmp(&b.check_in)
            .then_with(|| room_key(a).cmp(&room_key(b)))
            .then_with(|| a.id.cmp(&b.id))
    });
    outcome.removed.sort_by(|a, b| a.id.cmp(&b.id));
    outcome
}
