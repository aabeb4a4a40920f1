use crate::domain::booking::{Booking, NewBooking};
use crate::domain::guest::{Guest, NewGuest};
use crate::domain::housekeeping::{HousekeepingTask, NewTask};
use crate::domain::ports::{
    BookingStore, GuestStore, HousekeepingTaskStore, PropertyStore, RoomStore, RoomTypeStore,
};
use crate::domain::room::{NewProperty, NewRoom, NewRoomType, Property, Room, RoomType};
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

fn mint_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// A thread-safe in-memory store for guest records.
///
/// Uses `Arc<RwLock<HashMap<String, Guest>>>` to allow shared concurrent
/// access. Email uniqueness is enforced under the write lock, but only for
/// non-empty emails; walk-ins without one coexist freely.
#[derive(Default, Clone)]
pub struct InMemoryGuestStore {
    guests: Arc<RwLock<HashMap<String, Guest>>>,
}

impl InMemoryGuestStore {
    /// Creates a new, empty in-memory guest store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GuestStore for InMemoryGuestStore {
    async fn list(&self) -> Result<Vec<Guest>> {
        let guests = self.guests.read().await;
        Ok(guests.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Guest>> {
        let guests = self.guests.read().await;
        Ok(guests.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Guest>> {
        if email.is_empty() {
            return Ok(None);
        }
        let guests = self.guests.read().await;
        Ok(guests.values().find(|g| g.email == email).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Guest>> {
        if slug.is_empty() {
            return Ok(None);
        }
        let guests = self.guests.read().await;
        Ok(guests.values().find(|g| g.slug == slug).cloned())
    }

    async fn create(&self, new: NewGuest) -> Result<Guest> {
        let mut guests = self.guests.write().await;
        if !new.email.is_empty() && guests.values().any(|g| g.email == new.email) {
            return Err(BookingError::Constraint(format!(
                "guest email {} already exists",
                new.email
            )));
        }
        let guest = new.into_guest(mint_id());
        guests.insert(guest.id.clone(), guest.clone());
        Ok(guest)
    }

    async fn update(&self, guest: Guest) -> Result<Guest> {
        let mut guests = self.guests.write().await;
        if !guests.contains_key(&guest.id) {
            return Err(BookingError::not_found("guest", guest.id));
        }
        if !guest.email.is_empty()
            && guests
                .values()
                .any(|g| g.id != guest.id && g.email == guest.email)
        {
            return Err(BookingError::Constraint(format!(
                "guest email {} already exists",
                guest.email
            )));
        }
        guests.insert(guest.id.clone(), guest.clone());
        Ok(guest)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.guests.write().await.remove(id);
        Ok(())
    }
}

/// A thread-safe in-memory store for rooms, unique by room number.
#[derive(Default, Clone)]
pub struct InMemoryRoomStore {
    rooms: Arc<RwLock<HashMap<String, Room>>>,
}

impl InMemoryRoomStore {
    /// Creates a new, empty in-memory room store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn list(&self) -> Result<Vec<Room>> {
        let rooms = self.rooms.read().await;
        Ok(rooms.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Room>> {
        let rooms = self.rooms.read().await;
        Ok(rooms.get(id).cloned())
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Room>> {
        let rooms = self.rooms.read().await;
        Ok(rooms.values().find(|r| r.number == number).cloned())
    }

    async fn create(&self, new: NewRoom) -> Result<Room> {
        let mut rooms = self.rooms.write().await;
        if rooms.values().any(|r| r.number == new.number) {
            return Err(BookingError::Constraint(format!(
                "room number {} already exists",
                new.number
            )));
        }
        let room = new.into_room(mint_id());
        rooms.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    async fn update(&self, room: Room) -> Result<Room> {
        let mut rooms = self.rooms.write().await;
        if !rooms.contains_key(&room.id) {
            return Err(BookingError::not_found("room", room.id));
        }
        if rooms
            .values()
            .any(|r| r.id != room.id && r.number == room.number)
        {
            return Err(BookingError::Constraint(format!(
                "room number {} already exists",
                room.number
            )));
        }
        rooms.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.rooms.write().await.remove(id);
        Ok(())
    }
}

/// A thread-safe in-memory store for bookings.
///
/// This store is the final arbiter of room availability: `create` and
/// `update` re-check the active-overlap exclusion under the write lock, so
/// two racing writers can never both commit overlapping active stays on the
/// same room.
#[derive(Default, Clone)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<HashMap<String, Booking>>>,
}

impl InMemoryBookingStore {
    /// Creates a new, empty in-memory booking store.
    pub fn new() -> Self {
        Self::default()
    }

    fn overlap_among<'a>(
        bookings: impl Iterator<Item = &'a Booking>,
        candidate: &Booking,
    ) -> bool {
        candidate.is_active()
            && bookings
                .filter(|b| b.id != candidate.id)
                .filter(|b| b.room_id == candidate.room_id)
                .filter(|b| b.is_active())
                .any(|b| b.stay().overlaps(&candidate.stay()))
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn list(&self) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(id).cloned())
    }

    async fn for_room(&self, room_id: &str) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .filter(|b| b.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn for_guest(&self, guest_id: &str) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .filter(|b| b.guest_id == guest_id)
            .cloned()
            .collect())
    }

    async fn in_group(&self, group_id: &str) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .filter(|b| b.group.as_ref().is_some_and(|g| g.group_id == group_id))
            .cloned()
            .collect())
    }

    async fn create(&self, new: NewBooking) -> Result<Booking> {
        let mut bookings = self.bookings.write().await;
        let booking = new.into_booking(mint_id());
        if Self::overlap_among(bookings.values(), &booking) {
            return Err(BookingError::Constraint(format!(
                "room {} already has an active booking overlapping {}",
                booking.room_id,
                booking.stay()
            )));
        }
        bookings.insert(booking.id.clone(), booking.clone());
        Ok(booking)
    }

    async fn update(&self, booking: Booking) -> Result<Booking> {
        let mut bookings = self.bookings.write().await;
        if !bookings.contains_key(&booking.id) {
            return Err(BookingError::not_found("booking", booking.id));
        }
        if Self::overlap_among(bookings.values(), &booking) {
            return Err(BookingError::Constraint(format!(
                "room {} already has an active booking overlapping {}",
                booking.room_id,
                booking.stay()
            )));
        }
        bookings.insert(booking.id.clone(), booking.clone());
        Ok(booking)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.bookings.write().await.remove(id);
        Ok(())
    }
}

/// A thread-safe in-memory store for housekeeping tasks.
#[derive(Default, Clone)]
pub struct InMemoryHousekeepingStore {
    tasks: Arc<RwLock<HashMap<String, HousekeepingTask>>>,
}

impl InMemoryHousekeepingStore {
    /// Creates a new, empty in-memory housekeeping store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HousekeepingTaskStore for InMemoryHousekeepingStore {
    async fn list(&self) -> Result<Vec<HousekeepingTask>> {
        let tasks = self.tasks.read().await;
        let mut tasks: Vec<HousekeepingTask> = tasks.values().cloned().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tasks)
    }

    async fn create(&self, new: NewTask) -> Result<HousekeepingTask> {
        let mut tasks = self.tasks.write().await;
        let task = new.into_task(mint_id());
        tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }
}

/// A thread-safe in-memory store for property records, unique by number.
#[derive(Default, Clone)]
pub struct InMemoryPropertyStore {
    properties: Arc<RwLock<HashMap<String, Property>>>,
}

impl InMemoryPropertyStore {
    /// Creates a new, empty in-memory property store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PropertyStore for InMemoryPropertyStore {
    async fn list(&self) -> Result<Vec<Property>> {
        let properties = self.properties.read().await;
        Ok(properties.values().cloned().collect())
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Property>> {
        let properties = self.properties.read().await;
        Ok(properties.values().find(|p| p.number == number).cloned())
    }

    async fn create(&self, new: NewProperty) -> Result<Property> {
        let mut properties = self.properties.write().await;
        if properties.values().any(|p| p.number == new.number) {
            return Err(BookingError::Constraint(format!(
                "property number {} already exists",
                new.number
            )));
        }
        let property = new.into_property(mint_id());
        properties.insert(property.id.clone(), property.clone());
        Ok(property)
    }
}

/// A thread-safe in-memory store for room types, unique by name.
#[derive(Default, Clone)]
pub struct InMemoryRoomTypeStore {
    room_types: Arc<RwLock<HashMap<String, RoomType>>>,
}

impl InMemoryRoomTypeStore {
    /// Creates a new, empty in-memory room type store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomTypeStore for InMemoryRoomTypeStore {
    async fn list(&self) -> Result<Vec<RoomType>> {
        let room_types = self.room_types.read().await;
        Ok(room_types.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<RoomType>> {
        let room_types = self.room_types.read().await;
        Ok(room_types.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<RoomType>> {
        let room_types = self.room_types.read().await;
        Ok(room_types
            .values()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn create(&self, new: NewRoomType) -> Result<RoomType> {
        let mut room_types = self.room_types.write().await;
        if room_types
            .values()
            .any(|t| t.name.eq_ignore_ascii_case(&new.name))
        {
            return Err(BookingError::Constraint(format!(
                "room type {} already exists",
                new.name
            )));
        }
        let room_type = new.into_room_type(mint_id());
        room_types.insert(room_type.id.clone(), room_type.clone());
        Ok(room_type)
    }
}
