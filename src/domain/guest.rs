use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::booking::{BookingSource, Money};

/// Normalizes an email for lookup and storage: trimmed and lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Deterministic slug for a guest, computed from the email when present and
/// the name otherwise. Lowercase alphanumeric runs joined by single dashes,
/// so the same natural key always produces the same slug.
pub fn slug_of(email: &str, name: &str) -> String {
    let source = if email.trim().is_empty() { name } else { email };
    let mut slug = String::with_capacity(source.len());
    let mut pending_dash = false;
    for c in source.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// The caller-supplied identity tuple the resolver works from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuestProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Fallback history record kept on the guest so a stay survives even after
/// its booking rows are deleted. Refreshed on every new booking, finalized at
/// check-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaySnapshot {
    pub room_number: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub source: BookingSource,
    pub revenue: Money,
    pub created_by: Option<String>,
    pub checked_in_by: Option<String>,
    pub checked_out_by: Option<String>,
    pub actual_check_out: Option<DateTime<Utc>>,
}

/// A durable guest identity resolved from a (name, email, phone) tuple.
///
/// At most one guest exists per normalized non-empty email. `slug` is the
/// secondary lookup key; `has_checked_out` marks that history exists and must
/// outlive booking deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    pub id: String,
    pub name: String,
    pub email: String,
    pub slug: String,
    pub phone: String,
    pub address: String,
    pub total_revenue: Money,
    pub total_stays: u32,
    pub has_checked_out: bool,
    pub last_stay: Option<StaySnapshot>,
}

impl Guest {
    /// Refreshes the mutable contact fields from a newer profile without
    /// touching the identity fields.
    pub fn absorb_contact(&mut self, profile: &GuestProfile) {
        if !profile.phone.trim().is_empty() {
            self.phone = profile.phone.trim().to_string();
        }
        if !profile.address.trim().is_empty() {
            self.address = profile.address.trim().to_string();
        }
    }

    /// Folds a new booking into the aggregates and refreshes the snapshot.
    pub fn record_stay(&mut self, snapshot: StaySnapshot) {
        self.total_revenue += snapshot.revenue;
        self.total_stays += 1;
        self.last_stay = Some(snapshot);
    }

    /// Replaces the snapshot with the final stay data at check-out. The
    /// aggregates were already updated at creation; only the history marker
    /// and the snapshot change here.
    pub fn finalize_stay(&mut self, snapshot: StaySnapshot) {
        self.has_checked_out = true;
        self.last_stay = Some(snapshot);
    }
}

/// Creation payload; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGuest {
    pub name: String,
    pub email: String,
    pub slug: String,
    pub phone: String,
    pub address: String,
}

impl NewGuest {
    pub fn from_profile(profile: &GuestProfile) -> Self {
        let email = normalize_email(&profile.email);
        Self {
            name: profile.name.trim().to_string(),
            slug: slug_of(&email, &profile.name),
            email,
            phone: profile.phone.trim().to_string(),
            address: profile.address.trim().to_string(),
        }
    }

    pub(crate) fn into_guest(self, id: String) -> Guest {
        Guest {
            id,
            name: self.name,
            email: self.email,
            slug: self.slug,
            phone: self.phone,
            address: self.address,
            total_revenue: Money::ZERO,
            total_stays: 0,
            has_checked_out: false,
            last_stay: None,
        }
    }
}
