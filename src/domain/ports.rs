use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::booking::{Booking, Money, NewBooking};
use crate::domain::guest::{Guest, NewGuest};
use crate::domain::housekeeping::{HousekeepingTask, NewTask};
use crate::domain::room::{NewProperty, NewRoom, NewRoomType, Property, Room, RoomType};
use crate::error::Result;

/// Persistence port for guests.
///
/// `create` assigns the record id and fails with `BookingError::Constraint`
/// when a guest with the same non-empty normalized email already exists.
/// Empty emails are soft-unique: they never collide.
#[async_trait]
pub trait GuestStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Guest>>;
    async fn get(&self, id: &str) -> Result<Option<Guest>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Guest>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Guest>>;
    async fn create(&self, guest: NewGuest) -> Result<Guest>;
    async fn update(&self, guest: Guest) -> Result<Guest>;
    /// Deleting an absent id is not an error.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Persistence port for rooms. Room numbers are unique; `create` fails with
/// `Constraint` on a duplicate number.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Room>>;
    async fn get(&self, id: &str) -> Result<Option<Room>>;
    async fn find_by_number(&self, number: &str) -> Result<Option<Room>>;
    async fn create(&self, room: NewRoom) -> Result<Room>;
    async fn update(&self, room: Room) -> Result<Room>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Persistence port for bookings.
///
/// `create` is the final arbiter for the overlap invariant: the adapter must
/// atomically reject (with `Constraint`) an active booking whose stay overlaps
/// an existing active booking on the same room. The engine's conflict check
/// remains a fast pre-check in front of this.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Booking>>;
    async fn get(&self, id: &str) -> Result<Option<Booking>>;
    async fn for_room(&self, room_id: &str) -> Result<Vec<Booking>>;
    async fn for_guest(&self, guest_id: &str) -> Result<Vec<Booking>>;
    async fn in_group(&self, group_id: &str) -> Result<Vec<Booking>>;
    async fn create(&self, booking: NewBooking) -> Result<Booking>;
    async fn update(&self, booking: Booking) -> Result<Booking>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Persistence port for the housekeeping queue.
#[async_trait]
pub trait HousekeepingTaskStore: Send + Sync {
    async fn list(&self) -> Result<Vec<HousekeepingTask>>;
    async fn create(&self, task: NewTask) -> Result<HousekeepingTask>;
}

/// Read-mostly port over the external property-management records.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Property>>;
    async fn find_by_number(&self, number: &str) -> Result<Option<Property>>;
    async fn create(&self, property: NewProperty) -> Result<Property>;
}

#[async_trait]
pub trait RoomTypeStore: Send + Sync {
    async fn list(&self) -> Result<Vec<RoomType>>;
    async fn get(&self, id: &str) -> Result<Option<RoomType>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<RoomType>>;
    async fn create(&self, room_type: NewRoomType) -> Result<RoomType>;
}

/// Outbound notification payload shared by every notice kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingNotice {
    pub booking_id: String,
    pub guest_name: String,
    pub guest_email: String,
    pub room_number: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// Folio summary attached to a check-out notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub total: Money,
    pub paid: Money,
    pub balance: Money,
}

/// Delivery port for guest-facing messages.
///
/// Consumed fire-and-forget through the outbox: a failed send is logged and
/// retried there, never surfaced into the lifecycle operation that queued it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_booking_confirmation(&self, notice: &BookingNotice) -> Result<()>;
    async fn send_check_in_notice(&self, notice: &BookingNotice) -> Result<()>;
    async fn send_check_out_notice(
        &self,
        notice: &BookingNotice,
        invoice: Option<&InvoiceSummary>,
    ) -> Result<()>;
}

pub type GuestStoreBox = Box<dyn GuestStore>;
pub type RoomStoreBox = Box<dyn RoomStore>;
pub type BookingStoreBox = Box<dyn BookingStore>;
pub type HousekeepingTaskStoreBox = Box<dyn HousekeepingTaskStore>;
pub type PropertyStoreBox = Box<dyn PropertyStore>;
pub type RoomTypeStoreBox = Box<dyn RoomTypeStore>;
pub type NotifierBox = Box<dyn Notifier>;
