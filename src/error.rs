use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::booking::BookingStatus;

pub type Result<T> = std::result::Result<T, BookingError>;

/// Error taxonomy for the reservation engine.
///
/// Validation variants (`RoomUnavailable`, `AlreadyOccupied`, the guard
/// variants) are raised before any write and surfaced to the caller verbatim.
/// `Constraint` is the storage adapter's uniqueness/exclusion signal; the
/// engine recovers from it during identity resolution and maps it to
/// `RoomUnavailable` during booking creation.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("room {room_number} is not available from {check_in} to {check_out}")]
    RoomUnavailable {
        room_number: String,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
    #[error("room {0} already has a checked-in booking")]
    AlreadyOccupied(String),
    #[error("booking {0} is checked in; check the guest out before deleting")]
    CannotDelete(String),
    #[error("booking {0} is not checked in and cannot be checked out")]
    CannotCheckOut(String),
    #[error("booking cannot move from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("an identical booking for {guest_email} in room {room_number} already exists")]
    DuplicateBooking {
        guest_email: String,
        room_number: String,
    },
    #[error("no identity could be resolved for {0}")]
    ResolutionFailed(String),
    #[error("booking is the last member of group {0}; delete the group instead")]
    LastGroupMember(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for BookingError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Internal(Box::new(err))
    }
}

impl BookingError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for the storage adapter's uniqueness/exclusion signal.
    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }
}
