use crate::domain::booking::{Booking, NewBooking};
use crate::domain::guest::{Guest, NewGuest};
use crate::domain::housekeeping::{HousekeepingTask, NewTask};
use crate::domain::ports::{
    BookingStore, GuestStore, HousekeepingTaskStore, PropertyStore, RoomStore, RoomTypeStore,
};
use crate::domain::room::{NewProperty, NewRoom, NewRoomType, Property, Room, RoomType};
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column family for guest identities.
pub const CF_GUESTS: &str = "guests";
/// Column family for rooms.
pub const CF_ROOMS: &str = "rooms";
/// Column family for bookings.
pub const CF_BOOKINGS: &str = "bookings";
/// Column family for housekeeping tasks.
pub const CF_HOUSEKEEPING: &str = "housekeeping";
/// Column family for property-management records.
pub const CF_PROPERTIES: &str = "properties";
/// Column family for room types.
pub const CF_ROOM_TYPES: &str = "room_types";

const ALL_CFS: [&str; 6] = [
    CF_GUESTS,
    CF_ROOMS,
    CF_BOOKINGS,
    CF_HOUSEKEEPING,
    CF_PROPERTIES,
    CF_ROOM_TYPES,
];

fn mint_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// A persistent store implementation using RocksDB.
///
/// Each collection lives in its own column family, keyed by record id with
/// JSON values. RocksDB has no unique indexes, so the email/number uniqueness
/// checks and the booking overlap exclusion scan their column family under a
/// single writer gate; reads stay lock-free.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    write_gate: Arc<Mutex<()>>,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// all column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()));
        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            write_gate: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            BookingError::Internal(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| {
            BookingError::Internal(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {e}"),
            )))
        })
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| {
            BookingError::Internal(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Deserialization error: {e}"),
            )))
        })
    }

    fn put<T: Serialize>(&self, cf_name: &str, id: &str, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        self.db.put_cf(cf, id.as_bytes(), Self::encode(value)?)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, cf_name: &str, id: &str) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(Self::decode(&value)?);
        }
        Ok(records)
    }

    fn remove(&self, cf_name: &str, id: &str) -> Result<()> {
        let cf = self.cf(cf_name)?;
        self.db.delete_cf(cf, id.as_bytes())?;
        Ok(())
    }
}

/// Active bookings on the same room must not overlap; terminal rows never block.
fn overlap_among<'a>(bookings: impl Iterator<Item = &'a Booking>, candidate: &Booking) -> bool {
    candidate.is_active()
        && bookings
            .filter(|b| b.id != candidate.id)
            .filter(|b| b.room_id == candidate.room_id)
            .filter(|b| b.is_active())
            .any(|b| b.stay().overlaps(&candidate.stay()))
}

#[async_trait]
impl GuestStore for RocksDbStore {
    async fn list(&self) -> Result<Vec<Guest>> {
        self.scan(CF_GUESTS)
    }

    async fn get(&self, id: &str) -> Result<Option<Guest>> {
        self.fetch(CF_GUESTS, id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Guest>> {
        if email.is_empty() {
            return Ok(None);
        }
        let guests: Vec<Guest> = self.scan(CF_GUESTS)?;
        Ok(guests.into_iter().find(|g| g.email == email))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Guest>> {
        if slug.is_empty() {
            return Ok(None);
        }
        let guests: Vec<Guest> = self.scan(CF_GUESTS)?;
        Ok(guests.into_iter().find(|g| g.slug == slug))
    }

    async fn create(&self, new: NewGuest) -> Result<Guest> {
        let _gate = self.write_gate.lock().await;
        if !new.email.is_empty() {
            let guests: Vec<Guest> = self.scan(CF_GUESTS)?;
            if guests.iter().any(|g| g.email == new.email) {
                return Err(BookingError::Constraint(format!(
                    "guest email {} already exists",
                    new.email
                )));
            }
        }
        let guest = new.into_guest(mint_id());
        self.put(CF_GUESTS, &guest.id, &guest)?;
        Ok(guest)
    }

    async fn update(&self, guest: Guest) -> Result<Guest> {
        let _gate = self.write_gate.lock().await;
        if self.fetch::<Guest>(CF_GUESTS, &guest.id)?.is_none() {
            return Err(BookingError::not_found("guest", guest.id));
        }
        if !guest.email.is_empty() {
            let guests: Vec<Guest> = self.scan(CF_GUESTS)?;
            if guests
                .iter()
                .any(|g| g.id != guest.id && g.email == guest.email)
            {
                return Err(BookingError::Constraint(format!(
                    "guest email {} already exists",
                    guest.email
                )));
            }
        }
        self.put(CF_GUESTS, &guest.id, &guest)?;
        Ok(guest)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.remove(CF_GUESTS, id)
    }
}

#[async_trait]
impl RoomStore for RocksDbStore {
    async fn list(&self) -> Result<Vec<Room>> {
        self.scan(CF_ROOMS)
    }

    async fn get(&self, id: &str) -> Result<Option<Room>> {
        self.fetch(CF_ROOMS, id)
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Room>> {
        let rooms: Vec<Room> = self.scan(CF_ROOMS)?;
        Ok(rooms.into_iter().find(|r| r.number == number))
    }

    async fn create(&self, new: NewRoom) -> Result<Room> {
        let _gate = self.write_gate.lock().await;
        let rooms: Vec<Room> = self.scan(CF_ROOMS)?;
        if rooms.iter().any(|r| r.number == new.number) {
            return Err(BookingError::Constraint(format!(
                "room number {} already exists",
                new.number
            )));
        }
        let room = new.into_room(mint_id());
        self.put(CF_ROOMS, &room.id, &room)?;
        Ok(room)
    }

    async fn update(&self, room: Room) -> Result<Room> {
        let _gate = self.write_gate.lock().await;
        if self.fetch::<Room>(CF_ROOMS, &room.id)?.is_none() {
            return Err(BookingError::not_found("room", room.id));
        }
        let rooms: Vec<Room> = self.scan(CF_ROOMS)?;
        if rooms
            .iter()
            .any(|r| r.id != room.id && r.number == room.number)
        {
            return Err(BookingError::Constraint(format!(
                "room number {} already exists",
                room.number
            )));
        }
        self.put(CF_ROOMS, &room.id, &room)?;
        Ok(room)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.remove(CF_ROOMS, id)
    }
}

#[async_trait]
impl BookingStore for RocksDbStore {
    async fn list(&self) -> Result<Vec<Booking>> {
        self.scan(CF_BOOKINGS)
    }

    async fn get(&self, id: &str) -> Result<Option<Booking>> {
        self.fetch(CF_BOOKINGS, id)
    }

    async fn for_room(&self, room_id: &str) -> Result<Vec<Booking>> {
        let bookings: Vec<Booking> = self.scan(CF_BOOKINGS)?;
        Ok(bookings
            .into_iter()
            .filter(|b| b.room_id == room_id)
            .collect())
    }

    async fn for_guest(&self, guest_id: &str) -> Result<Vec<Booking>> {
        let bookings: Vec<Booking> = self.scan(CF_BOOKINGS)?;
        Ok(bookings
            .into_iter()
            .filter(|b| b.guest_id == guest_id)
            .collect())
    }

    async fn in_group(&self, group_id: &str) -> Result<Vec<Booking>> {
        let bookings: Vec<Booking> = self.scan(CF_BOOKINGS)?;
        Ok(bookings
            .into_iter()
            .filter(|b| b.group.as_ref().is_some_and(|g| g.group_id == group_id))
            .collect())
    }

    async fn create(&self, new: NewBooking) -> Result<Booking> {
        let _gate = self.write_gate.lock().await;
        let booking = new.into_booking(mint_id());
        let existing: Vec<Booking> = self.scan(CF_BOOKINGS)?;
        if overlap_among(existing.iter(), &booking) {
            return Err(BookingError::Constraint(format!(
                "room {} already has an active booking overlapping {}",
                booking.room_id,
                booking.stay()
            )));
        }
        self.put(CF_BOOKINGS, &booking.id, &booking)?;
        Ok(booking)
    }

    async fn update(&self, booking: Booking) -> Result<Booking> {
        let _gate = self.write_gate.lock().await;
        if self.fetch::<Booking>(CF_BOOKINGS, &booking.id)?.is_none() {
            return Err(BookingError::not_found("booking", booking.id));
        }
        let existing: Vec<Booking> = self.scan(CF_BOOKINGS)?;
        if overlap_among(existing.iter(), &booking) {
            return Err(BookingError::Constraint(format!(
                "room {} already has an active booking overlapping {}",
                booking.room_id,
                booking.stay()
            )));
        }
        self.put(CF_BOOKINGS, &booking.id, &booking)?;
        Ok(booking)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.remove(CF_BOOKINGS, id)
    }
}

#[async_trait]
impl HousekeepingTaskStore for RocksDbStore {
    async fn list(&self) -> Result<Vec<HousekeepingTask>> {
        let mut tasks: Vec<HousekeepingTask> = self.scan(CF_HOUSEKEEPING)?;
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tasks)
    }

    async fn create(&self, new: NewTask) -> Result<HousekeepingTask> {
        let task = new.into_task(mint_id());
        self.put(CF_HOUSEKEEPING, &task.id, &task)?;
        Ok(task)
    }
}

#[async_trait]
impl PropertyStore for RocksDbStore {
    async fn list(&self) -> Result<Vec<Property>> {
        self.scan(CF_PROPERTIES)
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Property>> {
        let properties: Vec<Property> = self.scan(CF_PROPERTIES)?;
        Ok(properties.into_iter().find(|p| p.number == number))
    }

    async fn create(&self, new: NewProperty) -> Result<Property> {
        let _gate = self.write_gate.lock().await;
        let properties: Vec<Property> = self.scan(CF_PROPERTIES)?;
        if properties.iter().any(|p| p.number == new.number) {
            return Err(BookingError::Constraint(format!(
                "property number {} already exists",
                new.number
            )));
        }
        let property = new.into_property(mint_id());
        self.put(CF_PROPERTIES, &property.id, &property)?;
        Ok(property)
    }
}

#[async_trait]
impl RoomTypeStore for RocksDbStore {
    async fn list(&self) -> Result<Vec<RoomType>> {
        self.scan(CF_ROOM_TYPES)
    }

    async fn get(&self, id: &str) -> Result<Option<RoomType>> {
        self.fetch(CF_ROOM_TYPES, id)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<RoomType>> {
        let room_types: Vec<RoomType> = self.scan(CF_ROOM_TYPES)?;
        Ok(room_types
            .into_iter()
            .find(|t| t.name.eq_ignore_ascii_case(name)))
    }

    async fn create(&self, new: NewRoomType) -> Result<RoomType> {
        let _gate = self.write_gate.lock().await;
        let room_types: Vec<RoomType> = self.scan(CF_ROOM_TYPES)?;
        if room_types
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(&new.name))
        {
            return Err(BookingError::Constraint(format!(
                "room type {} already exists",
                new.name
            )));
        }
        let room_type = new.into_room_type(mint_id());
        self.put(CF_ROOM_TYPES, &room_type.id, &room_type)?;
        Ok(room_type)
    }
}
