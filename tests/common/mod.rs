use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use frontdesk::application::engine::{BookingRequest, ReservationEngine, Stores};
use frontdesk::application::outbox::NotificationOutbox;
use frontdesk::domain::actor::Actor;
use frontdesk::domain::booking::{Booking, BookingSource, BookingStatus, Money, NewBooking};
use frontdesk::domain::guest::GuestProfile;
use frontdesk::domain::ports::{BookingStore, RoomStore, RoomTypeStore};
use frontdesk::domain::room::{NewRoom, NewRoomType, RoomStatus};
use frontdesk::error::Result;
use frontdesk::infrastructure::in_memory::{
    InMemoryBookingStore, InMemoryGuestStore, InMemoryHousekeepingStore, InMemoryPropertyStore,
    InMemoryRoomStore, InMemoryRoomTypeStore,
};
use frontdesk::infrastructure::notifier::{RecordingNotifier, SentNotification};
use rust_decimal_macros::dec;
use tokio::sync::{Mutex, RwLock};

/// An engine over fresh in-memory stores with rooms 101-103 seeded and a
/// recording notifier wired through the outbox. The concrete store handles
/// share state with the boxed ones inside the engine.
pub struct Harness {
    pub engine: ReservationEngine,
    pub guests: InMemoryGuestStore,
    pub rooms: InMemoryRoomStore,
    pub bookings: InMemoryBookingStore,
    pub housekeeping: InMemoryHousekeepingStore,
    pub sent: Arc<Mutex<Vec<SentNotification>>>,
}

pub async fn harness() -> Harness {
    let guests = InMemoryGuestStore::new();
    let rooms = InMemoryRoomStore::new();
    let bookings = InMemoryBookingStore::new();
    let housekeeping = InMemoryHousekeepingStore::new();
    let properties = InMemoryPropertyStore::new();
    let room_types = InMemoryRoomTypeStore::new();

    let double = room_types
        .create(NewRoomType {
            name: "Double".into(),
        })
        .await
        .unwrap();
    for number in ["101", "102", "103"] {
        rooms
            .create(NewRoom {
                number: number.into(),
                room_type_id: double.id.clone(),
                status: RoomStatus::Available,
            })
            .await
            .unwrap();
    }

    let (notifier, sent) = RecordingNotifier::boxed();
    let stores = Stores {
        guests: Box::new(guests.clone()),
        rooms: Box::new(rooms.clone()),
        bookings: Box::new(bookings.clone()),
        housekeeping: Box::new(housekeeping.clone()),
        properties: Box::new(properties),
        room_types: Box::new(room_types),
    };
    Harness {
        engine: ReservationEngine::new(stores, NotificationOutbox::spawn(notifier)),
        guests,
        rooms,
        bookings,
        housekeeping,
        sent,
    }
}

pub fn desk() -> Actor {
    Actor::new("t1", "Front Desk")
}

pub fn request(
    name: &str,
    email: &str,
    room: &str,
    check_in: &str,
    check_out: &str,
) -> BookingRequest {
    BookingRequest {
        guest: GuestProfile {
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            address: String::new(),
        },
        room_number: room.into(),
        room_type_hint: Some("Double".into()),
        check_in: check_in.parse().unwrap(),
        check_out: check_out.parse().unwrap(),
        status: BookingStatus::Confirmed,
        total_price: Money::new(dec!(100.00)),
        num_guests: 1,
        source: BookingSource::Reception,
        notes: String::new(),
    }
}

/// Booking store with no overlap arbitration, standing in for the legacy
/// system that bookings were imported from. Lets tests seed the conflicting
/// and duplicated rows a constraint-enforcing store would refuse.
#[derive(Default, Clone)]
pub struct RawBookingStore {
    rows: Arc<RwLock<HashMap<String, Booking>>>,
}

impl RawBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row verbatim, id included.
    pub async fn put(&self, booking: Booking) {
        self.rows.write().await.insert(booking.id.clone(), booking);
    }
}

#[async_trait]
impl BookingStore for RawBookingStore {
    async fn list(&self) -> Result<Vec<Booking>> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Booking>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn for_room(&self, room_id: &str) -> Result<Vec<Booking>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|b| b.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn for_guest(&self, guest_id: &str) -> Result<Vec<Booking>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|b| b.guest_id == guest_id)
            .cloned()
            .collect())
    }

    async fn in_group(&self, group_id: &str) -> Result<Vec<Booking>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|b| b.group.as_ref().is_some_and(|g| g.group_id == group_id))
            .cloned()
            .collect())
    }

    async fn create(&self, new: NewBooking) -> Result<Booking> {
        let booking = Booking {
            id: uuid::Uuid::new_v4().simple().to_string(),
            guest_id: new.guest_id,
            room_id: new.room_id,
            check_in: new.check_in,
            check_out: new.check_out,
            status: new.status,
            total_price: new.total_price,
            num_guests: new.num_guests,
            source: new.source,
            amount_paid: new.amount_paid,
            payment_status: new.payment_status,
            notes: new.notes,
            group: new.group,
            created_by: new.created_by,
            checked_in_by: None,
            actual_check_in: None,
            checked_out_by: None,
            actual_check_out: None,
        };
        self.put(booking.clone()).await;
        Ok(booking)
    }

    async fn update(&self, booking: Booking) -> Result<Booking> {
        self.put(booking.clone()).await;
        Ok(booking)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.rows.write().await.remove(id);
        Ok(())
    }
}

/// An engine whose booking store is a `RawBookingStore`, for exercising the
/// conflict and dedup views over dirty data.
pub struct LegacyHarness {
    pub engine: ReservationEngine,
    pub bookings: RawBookingStore,
    pub guests: InMemoryGuestStore,
    pub rooms: InMemoryRoomStore,
}

pub async fn legacy_harness() -> LegacyHarness {
    let guests = InMemoryGuestStore::new();
    let rooms = InMemoryRoomStore::new();
    let bookings = RawBookingStore::new();
    let room_types = InMemoryRoomTypeStore::new();

    let double = room_types
        .create(NewRoomType {
            name: "Double".into(),
        })
        .await
        .unwrap();
    for number in ["101", "102", "103"] {
        rooms
            .create(NewRoom {
                number: number.into(),
                room_type_id: double.id.clone(),
                status: RoomStatus::Available,
            })
            .await
            .unwrap();
    }

    let (notifier, _) = RecordingNotifier::boxed();
    let stores = Stores {
        guests: Box::new(guests.clone()),
        rooms: Box::new(rooms.clone()),
        bookings: Box::new(bookings.clone()),
        housekeeping: Box::new(InMemoryHousekeepingStore::new()),
        properties: Box::new(InMemoryPropertyStore::new()),
        room_types: Box::new(room_types),
    };
    LegacyHarness {
        engine: ReservationEngine::new(stores, NotificationOutbox::spawn(notifier)),
        bookings,
        guests,
        rooms,
    }
}

/// A raw booking row the way a legacy export would carry it.
pub fn booking_row(
    id: &str,
    guest_id: &str,
    room_id: &str,
    check_in: &str,
    check_out: &str,
    status: BookingStatus,
) -> Booking {
    Booking {
        id: id.into(),
        guest_id: guest_id.into(),
        room_id: room_id.into(),
        check_in: check_in.parse().unwrap(),
        check_out: check_out.parse().unwrap(),
        status,
        total_price: Money::new(dec!(100.00)),
        num_guests: 1,
        source: BookingSource::Online,
        amount_paid: Money::ZERO,
        payment_status: Default::default(),
        notes: String::new(),
        group: None,
        created_by: None,
        checked_in_by: None,
        actual_check_in: None,
        checked_out_by: None,
        actual_check_out: None,
    }
}
