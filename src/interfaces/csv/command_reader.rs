use crate::application::engine::BookingRequest;
use crate::domain::booking::{BookingSource, BookingStatus, Money};
use crate::domain::guest::GuestProfile;
use crate::error::{BookingError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// What a command row asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOp {
    Create,
    CheckIn,
    CheckOut,
    Cancel,
    Delete,
    Extend,
}

/// One row of the front-desk command log.
///
/// Only `op` and `room` are always required; lifecycle commands address their
/// booking by room number plus check-in date, `create` additionally carries
/// the guest and stay details.
#[derive(Debug, Clone, Deserialize)]
pub struct Command {
    pub op: CommandOp,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
    pub price: Option<Decimal>,
    pub guests: Option<u32>,
    pub source: Option<BookingSource>,
    #[serde(default)]
    pub notes: String,
}

impl Command {
    /// Builds the engine request for a `create` row.
    ///
    /// Both stay dates are required; status, price, guests, and source fall
    /// back to reserved, zero, one, and reception.
    pub fn booking_request(&self) -> Result<BookingRequest> {
        Ok(BookingRequest {
            guest: GuestProfile {
                name: self.name.clone(),
                email: self.email.clone(),
                phone: self.phone.clone(),
                address: String::new(),
            },
            room_number: self.room.clone(),
            room_type_hint: None,
            check_in: self.check_in.ok_or_else(|| missing("check_in"))?,
            check_out: self.check_out.ok_or_else(|| missing("check_out"))?,
            status: self.status.unwrap_or(BookingStatus::Reserved),
            total_price: Money::new(self.price.unwrap_or_default()),
            num_guests: self.guests.unwrap_or(1),
            source: self.source.unwrap_or(BookingSource::Reception),
            notes: self.notes.clone(),
        })
    }

    /// The (room, check-in) key lifecycle rows address their booking by.
    pub fn stay_key(&self) -> Result<(&str, NaiveDate)> {
        let check_in = self.check_in.ok_or_else(|| missing("check_in"))?;
        Ok((self.room.as_str(), check_in))
    }
}

fn missing(field: &str) -> BookingError {
    BookingError::Validation(format!("command is missing required field {field}"))
}

/// Reads front-desk commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over
/// `Result<Command>`. It handles whitespace trimming and flexible record
/// lengths automatically.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes commands.
    ///
    /// This allows for processing large command logs in a streaming fashion
    /// without loading the entire file into memory.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BookingError::from))
    }
}
