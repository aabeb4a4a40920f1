use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::group::GroupMembership;
use crate::error::{BookingError, Result};

/// Monetary value in the hotel's currency.
///
/// A wrapper around `rust_decimal::Decimal` so revenue arithmetic never goes
/// through floats.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states of a booking.
///
/// `Reserved` and `Confirmed` are the legal initial states; `CheckedOut` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Reserved,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    /// Active bookings count toward occupancy and overlap checks.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Reserved | Self::Confirmed | Self::CheckedIn)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::CheckedOut | Self::Cancelled)
    }

    /// Total order used to pick a survivor among duplicate bookings.
    pub fn lifecycle_rank(self) -> u8 {
        match self {
            Self::CheckedOut => 5,
            Self::CheckedIn => 4,
            Self::Confirmed => 3,
            Self::Reserved => 2,
            Self::Cancelled => 1,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reserved => "reserved",
            Self::Confirmed => "confirmed",
            Self::CheckedIn => "checked-in",
            Self::CheckedOut => "checked-out",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Where the booking came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    Online,
    Reception,
    VoiceAgent,
}

impl fmt::Display for BookingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Online => "online",
            Self::Reception => "reception",
            Self::VoiceAgent => "voice_agent",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Partial,
    Paid,
    Refunded,
}

/// A half-open stay interval `[check_in, check_out)` over calendar days.
///
/// The checkout day itself is not occupied: a guest departing on day D and
/// another arriving on day D never conflict. Working in `NaiveDate` keeps the
/// comparison on calendar days, so no timezone drift can creep in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StayRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self> {
        if check_in >= check_out {
            return Err(BookingError::Validation(format!(
                "check-out {check_out} must be after check-in {check_in}"
            )));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Two half-open intervals overlap iff `s1 < e2 && s2 < e1`.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// True if `day` falls within the stay (checkout day excluded).
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.check_in <= day && day < self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

impl fmt::Display for StayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.check_in, self.check_out)
    }
}

/// A stay of one guest in one room.
///
/// Mutated only through the lifecycle transitions in the application layer;
/// never hard-deleted while checked in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub guest_id: String,
    pub room_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
    pub total_price: Money,
    pub num_guests: u32,
    pub source: BookingSource,
    pub amount_paid: Money,
    pub payment_status: PaymentStatus,
    /// Free-form desk notes. Structured data never hides in here; group and
    /// payment details live in their own fields.
    pub notes: String,
    pub group: Option<GroupMembership>,
    pub created_by: Option<String>,
    pub checked_in_by: Option<String>,
    pub actual_check_in: Option<DateTime<Utc>>,
    pub checked_out_by: Option<String>,
    pub actual_check_out: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn stay(&self) -> StayRange {
        StayRange {
            check_in: self.check_in,
            check_out: self.check_out,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Amount still owed at departure, including group billing adjustments on
    /// the primary member.
    pub fn balance_due(&self) -> Money {
        let mut due = self.total_price;
        if let Some(group) = &self.group
            && group.primary
        {
            due += group.additional_charges;
            due -= group.discount;
        }
        due - self.amount_paid
    }
}

/// Creation payload; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub guest_id: String,
    pub room_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
    pub total_price: Money,
    pub num_guests: u32,
    pub source: BookingSource,
    pub amount_paid: Money,
    pub payment_status: PaymentStatus,
    pub notes: String,
    pub group: Option<GroupMembership>,
    pub created_by: Option<String>,
}

impl NewBooking {
    pub fn stay(&self) -> StayRange {
        StayRange {
            check_in: self.check_in,
            check_out: self.check_out,
        }
    }

    pub(crate) fn into_booking(self, id: String) -> Booking {
        Booking {
            id,
            guest_id: self.guest_id,
            room_id: self.room_id,
            check_in: self.check_in,
            check_out: self.check_out,
            status: self.status,
            total_price: self.total_price,
            num_guests: self.num_guests,
            source: self.source,
            amount_paid: self.amount_paid,
            payment_status: self.payment_status,
            notes: self.notes,
            group: self.group,
            created_by: self.created_by,
            checked_in_by: None,
            actual_check_in: None,
            checked_out_by: None,
            actual_check_out: None,
        }
    }
}
