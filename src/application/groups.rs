//! Group booking coordination.
//!
//! A group is a set of bookings sharing a minted group id and a human-facing
//! reference. Exactly one member is primary; it alone carries the group's
//! additional charges and discount, and removing it hands the role to a
//! successor before the record goes away.

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::domain::booking::{Booking, Money, StayRange};
use crate::domain::group::GroupMembership;
use crate::error::{BookingError, Result};

/// Billing options applied to the primary member only.
#[derive(Debug, Clone, Default)]
pub struct GroupOptions {
    pub billing_contact: String,
    pub additional_charges: Money,
    pub discount: Money,
}

/// Outcome of removing one member from its group.
#[derive(Debug, Clone)]
pub struct GroupRemoval {
    pub removed_id: String,
    pub remaining: usize,
    pub new_primary_id: Option<String>,
}

/// Mints the reference printed on folios and shared by every member.
pub fn mint_reference() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();
    format!("GRP-{suffix}")
}

/// Rejects batches whose members collide with each other. Runs before any
/// member is written so a failed group creation leaves no partial state.
pub fn check_intra_batch(stays: &[(String, StayRange)]) -> Result<()> {
    for (i, (room_a, stay_a)) in stays.iter().enumerate() {
        for (room_b, stay_b) in &stays[i + 1..] {
            if room_a == room_b && stay_a.overlaps(stay_b) {
                return Err(BookingError::RoomUnavailable {
                    room_number: room_b.clone(),
                    check_in: stay_b.check_in,
                    check_out: stay_b.check_out,
                });
            }
        }
    }
    Ok(())
}

pub fn primary_membership(
    group_id: &str,
    reference: &str,
    options: &GroupOptions,
) -> GroupMembership {
    GroupMembership {
        group_id: group_id.to_string(),
        reference: reference.to_string(),
        primary: true,
        billing_contact: options.billing_contact.clone(),
        additional_charges: options.additional_charges,
        discount: options.discount,
    }
}

/// Member inheriting the primary role when `leaving_id` departs. Lexically
/// smallest id wins so the choice is stable across replays.
pub fn successor<'a>(members: &'a [Booking], leaving_id: &str) -> Option<&'a Booking> {
    members
        .iter()
        .filter(|b| b.id != leaving_id)
        .min_by(|a, b| a.id.cmp(&b.id))
}
