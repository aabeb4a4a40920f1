use std::collections::HashMap;

use chrono::{NaiveDate, Utc};

use crate::application::conflicts::{self, ConflictingStay, RoomConflicts};
use crate::application::dedup;
use crate::application::groups::{self, GroupOptions, GroupRemoval};
use crate::application::identity::IdentityResolver;
use crate::application::lifecycle;
use crate::application::outbox::{NotificationJob, NotificationOutbox};
use crate::application::report::{self, EndOfDayReport, LedgerEntry};
use crate::domain::actor::Actor;
use crate::domain::booking::{
    Booking, BookingSource, BookingStatus, Money, NewBooking, PaymentStatus, StayRange,
};
use crate::domain::group::GroupMembership;
use crate::domain::guest::{Guest, GuestProfile, StaySnapshot};
use crate::domain::housekeeping::{NewTask, TaskStatus};
use crate::domain::ports::{
    BookingNotice, BookingStoreBox, GuestStoreBox, HousekeepingTaskStoreBox, InvoiceSummary,
    PropertyStoreBox, RoomStoreBox, RoomTypeStoreBox,
};
use crate::domain::room::{Room, RoomStatus};
use crate::error::{BookingError, Result};

/// The storage backends the engine operates on, one port per collection.
pub struct Stores {
    pub guests: GuestStoreBox,
    pub rooms: RoomStoreBox,
    pub bookings: BookingStoreBox,
    pub housekeeping: HousekeepingTaskStoreBox,
    pub properties: PropertyStoreBox,
    pub room_types: RoomTypeStoreBox,
}

/// Everything needed to record one stay. Guests and rooms are referenced by
/// natural keys and resolved to durable records on the way in.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub guest: GuestProfile,
    pub room_number: String,
    pub room_type_hint: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
    pub total_price: Money,
    pub num_guests: u32,
    pub source: BookingSource,
    pub notes: String,
}

impl BookingRequest {
    pub fn stay(&self) -> Result<StayRange> {
        StayRange::new(self.check_in, self.check_out)
    }
}

/// The main entry point for the reservation application.
///
/// `ReservationEngine` owns the storage ports and the notification outbox and
/// processes every operation sequentially: each one is validated against the
/// current store state, persisted, and only then allowed to emit side effects.
/// Notifications go through the outbox and can never fail an operation.
pub struct ReservationEngine {
    stores: Stores,
    outbox: NotificationOutbox,
}

impl ReservationEngine {
    pub fn new(stores: Stores, outbox: NotificationOutbox) -> Self {
        Self { stores, outbox }
    }

    /// Records a new individual stay.
    ///
    /// The guest and room are resolved from their natural keys, the request
    /// is checked against duplicates and overlapping active bookings, and the
    /// store enforces the overlap exclusion once more at write time. On
    /// success the room is reset to available (unless occupied or under
    /// maintenance), the guest's aggregates are updated, and a confirmation
    /// notice is queued.
    pub async fn create_booking(&self, request: BookingRequest, actor: &Actor) -> Result<Booking> {
        self.create_checked(request, None, actor).await
    }

    /// Creates several stays under one group reference.
    ///
    /// The whole batch is validated first, both against the stored bookings
    /// and against itself, so a rejected group leaves nothing behind. The
    /// first request becomes the primary member and alone carries the group's
    /// additional charges and discount.
    pub async fn create_group_booking(
        &self,
        requests: Vec<BookingRequest>,
        options: GroupOptions,
        actor: &Actor,
    ) -> Result<Vec<Booking>> {
        if requests.is_empty() {
            return Err(BookingError::Validation(
                "a group booking needs at least one stay".into(),
            ));
        }

        let resolver = self.resolver();
        let mut stays = Vec::with_capacity(requests.len());
        for request in &requests {
            let stay = request.stay()?;
            let room = resolver
                .resolve_room(&request.room_number, request.room_type_hint.as_deref())
                .await?;
            if conflicts::has_overlap(self.stores.bookings.as_ref(), &room.id, stay, None).await? {
                return Err(BookingError::RoomUnavailable {
                    room_number: room.number,
                    check_in: stay.check_in,
                    check_out: stay.check_out,
                });
            }
            stays.push((room.number, stay));
        }
        groups::check_intra_batch(&stays)?;

        let group_id = uuid::Uuid::new_v4().simple().to_string();
        let reference = groups::mint_reference();
        tracing::info!(
            group_id = %group_id,
            reference = %reference,
            members = requests.len(),
            "creating group booking"
        );

        let mut bookings = Vec::with_capacity(requests.len());
        for (i, request) in requests.into_iter().enumerate() {
            let membership = if i == 0 {
                groups::primary_membership(&group_id, &reference, &options)
            } else {
                GroupMembership::member_of(&group_id, &reference, &options.billing_contact)
            };
            bookings.push(self.create_checked(request, Some(membership), actor).await?);
        }
        Ok(bookings)
    }

    /// Adds one more stay to an existing group as a non-primary member,
    /// reusing the group's reference and billing contact.
    pub async fn add_to_group(
        &self,
        group_id: &str,
        request: BookingRequest,
        actor: &Actor,
    ) -> Result<Booking> {
        let members = self.stores.bookings.in_group(group_id).await?;
        let Some(membership) = members.iter().find_map(|b| b.group.as_ref()) else {
            return Err(BookingError::not_found("group", group_id));
        };
        let new_member =
            GroupMembership::member_of(group_id, &membership.reference, &membership.billing_contact);
        self.create_checked(request, Some(new_member), actor).await
    }

    /// Removes one member from its group and deletes the booking.
    ///
    /// The sole remaining member cannot be removed this way. When the primary
    /// leaves, its role and billing adjustments move to the remaining member
    /// with the smallest id before the record is deleted.
    pub async fn remove_from_group(&self, booking_id: &str, actor: &Actor) -> Result<GroupRemoval> {
        let booking = self
            .stores
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| BookingError::not_found("booking", booking_id))?;
        let Some(membership) = booking.group.clone() else {
            return Err(BookingError::Validation(format!(
                "booking {booking_id} is not part of a group"
            )));
        };
        let members = self.stores.bookings.in_group(&membership.group_id).await?;
        if members.len() <= 1 {
            return Err(BookingError::LastGroupMember(membership.group_id));
        }

        self.delete_booking(booking_id, actor).await?;

        let remaining = self.stores.bookings.in_group(&membership.group_id).await?;
        let new_primary_id = if membership.primary {
            remaining
                .iter()
                .find(|b| b.group.as_ref().is_some_and(|g| g.primary))
                .map(|b| b.id.clone())
        } else {
            None
        };
        Ok(GroupRemoval {
            removed_id: booking_id.to_string(),
            remaining: remaining.len(),
            new_primary_id,
        })
    }

    /// Moves a booking through the lifecycle.
    ///
    /// Check-in additionally requires the room to be physically free: no
    /// other checked-in booking may exist on it, regardless of dates. Check
    /// -out queues housekeeping, finalizes the guest's stay history, and
    /// sends the departure notice with an invoice summary.
    pub async fn update_booking_status(
        &self,
        booking_id: &str,
        to: BookingStatus,
        actor: &Actor,
    ) -> Result<Booking> {
        let mut booking = self
            .stores
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| BookingError::not_found("booking", booking_id))?;
        let from = booking.status;

        if to == BookingStatus::CheckedIn {
            // One physical occupant per room, whatever the dates say.
            let on_room = self.stores.bookings.for_room(&booking.room_id).await?;
            if on_room
                .iter()
                .any(|b| b.id != booking.id && b.status == BookingStatus::CheckedIn)
            {
                let number = self.room_number(&booking.room_id).await?;
                return Err(BookingError::AlreadyOccupied(number));
            }
        }

        lifecycle::advance(&mut booking, to, actor, Utc::now())?;
        let booking = self.stores.bookings.update(booking).await?;

        if let Some(next_status) = lifecycle::room_status_after(from, to)
            && let Some(mut room) = self.stores.rooms.get(&booking.room_id).await?
        {
            room.status = next_status;
            self.stores.rooms.update(room).await?;
        }

        match to {
            BookingStatus::CheckedIn => {
                if let Some(guest) = self.stores.guests.get(&booking.guest_id).await?
                    && let Some(room) = self.stores.rooms.get(&booking.room_id).await?
                {
                    self.outbox
                        .enqueue(NotificationJob::CheckInNotice(notice(&booking, &guest, &room)));
                }
            }
            BookingStatus::CheckedOut => self.on_check_out(&booking).await?,
            _ => {}
        }

        tracing::info!(
            booking_id = %booking.id,
            from = %from,
            to = %to,
            actor = %actor.id,
            "booking status updated"
        );
        Ok(booking)
    }

    /// Deletes a booking record.
    ///
    /// Checked-in bookings are protected; check the guest out first. The
    /// delete also sweeps accidental duplicates of the same stay, hands the
    /// group primary role to a successor when needed, and removes the guest
    /// record when no bookings remain and the guest never completed a stay.
    pub async fn delete_booking(&self, booking_id: &str, actor: &Actor) -> Result<()> {
        let booking = self
            .stores
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| BookingError::not_found("booking", booking_id))?;
        if booking.status == BookingStatus::CheckedIn {
            return Err(BookingError::CannotDelete(booking_id.to_string()));
        }

        if let Some(membership) = &booking.group
            && membership.primary
        {
            let members = self.stores.bookings.in_group(&membership.group_id).await?;
            if let Some(successor) = groups::successor(&members, &booking.id) {
                let mut successor = successor.clone();
                if let Some(next) = successor.group.as_mut() {
                    let mut leaving = membership.clone();
                    leaving.transfer_primary_to(next);
                    self.stores.bookings.update(successor).await?;
                }
            }
        }

        self.stores.bookings.delete(&booking.id).await?;

        // Stray duplicates of the same stay go with it, except anyone
        // physically checked in.
        let strays = self.stores.bookings.for_guest(&booking.guest_id).await?;
        for stray in strays {
            if stray.room_id == booking.room_id
                && stray.check_in == booking.check_in
                && stray.check_out == booking.check_out
                && stray.status != BookingStatus::CheckedIn
            {
                self.stores.bookings.delete(&stray.id).await?;
            }
        }

        let remaining = self.stores.bookings.for_guest(&booking.guest_id).await?;
        if remaining.is_empty()
            && let Some(guest) = self.stores.guests.get(&booking.guest_id).await?
            && !guest.has_checked_out
        {
            self.stores.guests.delete(&guest.id).await?;
        }

        tracing::info!(booking_id = %booking.id, actor = %actor.id, "booking deleted");
        Ok(())
    }

    /// Moves a booking's check-out date, keeping the room conflict-free.
    /// The conflict message names the guests in the way of the extension.
    pub async fn extend_stay(
        &self,
        booking_id: &str,
        new_check_out: NaiveDate,
        actor: &Actor,
    ) -> Result<Booking> {
        let mut booking = self
            .stores
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| BookingError::not_found("booking", booking_id))?;
        if !booking.is_active() {
            return Err(BookingError::Validation(format!(
                "booking {booking_id} is {} and cannot change dates",
                booking.status
            )));
        }
        let stay = StayRange::new(booking.check_in, new_check_out)?;

        let in_the_way = conflicts::conflicts_for(
            self.stores.bookings.as_ref(),
            self.stores.guests.as_ref(),
            &booking.room_id,
            stay,
            Some(&booking.id),
        )
        .await?;
        if !in_the_way.is_empty() {
            let number = self.room_number(&booking.room_id).await?;
            let names: Vec<String> = in_the_way
                .iter()
                .map(|c| format!("{} ({} to {})", c.guest_name, c.check_in, c.check_out))
                .collect();
            return Err(BookingError::Validation(format!(
                "cannot extend booking {booking_id} to {new_check_out}: room {number} is reserved by {}",
                names.join(", ")
            )));
        }

        booking.check_out = new_check_out;
        let booking = self.stores.bookings.update(booking).await?;
        tracing::info!(
            booking_id = %booking.id,
            check_out = %new_check_out,
            actor = %actor.id,
            "stay extended"
        );
        Ok(booking)
    }

    /// Looks a booking up by the natural key desk staff use: room number plus
    /// arrival date. When duplicates exist the furthest-progressed one wins.
    pub async fn find_booking(
        &self,
        room_number: &str,
        check_in: NaiveDate,
    ) -> Result<Option<Booking>> {
        let Some(room) = self.stores.rooms.find_by_number(room_number.trim()).await? else {
            return Ok(None);
        };
        let mut matches: Vec<Booking> = self
            .stores
            .bookings
            .for_room(&room.id)
            .await?
            .into_iter()
            .filter(|b| b.check_in == check_in)
            .collect();
        matches.sort_by(|a, b| {
            b.status
                .lifecycle_rank()
                .cmp(&a.status.lifecycle_rank())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matches.into_iter().next())
    }

    /// The canonical booking ledger: duplicates collapsed to their
    /// furthest-progressed record, sorted by arrival, room, id.
    pub async fn all_bookings(&self) -> Result<Vec<Booking>> {
        let rows = self.stores.bookings.list().await?;
        let guest_emails: HashMap<String, String> = self
            .stores
            .guests
            .list()
            .await?
            .into_iter()
            .map(|g| (g.id, g.email))
            .collect();
        let room_numbers: HashMap<String, String> = self
            .stores
            .rooms
            .list()
            .await?
            .into_iter()
            .map(|r| (r.id, r.number))
            .collect();
        Ok(dedup::canonical_bookings(rows, &guest_emails, &room_numbers).kept)
    }

    /// The canonical ledger joined with guest names, emails, and room numbers,
    /// ready for printing.
    pub async fn booking_ledger(&self) -> Result<Vec<LedgerEntry>> {
        let rows = self.stores.bookings.list().await?;
        let guests: HashMap<String, Guest> = self
            .stores
            .guests
            .list()
            .await?
            .into_iter()
            .map(|g| (g.id.clone(), g))
            .collect();
        let rooms: HashMap<String, Room> = self
            .stores
            .rooms
            .list()
            .await?
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();
        let guest_emails: HashMap<String, String> = guests
            .iter()
            .map(|(id, g)| (id.clone(), g.email.clone()))
            .collect();
        let room_numbers: HashMap<String, String> = rooms
            .iter()
            .map(|(id, r)| (id.clone(), r.number.clone()))
            .collect();
        let kept = dedup::canonical_bookings(rows, &guest_emails, &room_numbers).kept;
        Ok(report::ledger(&kept, &guests, &rooms))
    }

    /// Rooms whose active bookings overlap each other, with the guests
    /// involved. Normally empty; non-empty means double-booked inventory
    /// that needs `resolve_conflict`.
    pub async fn conflicted_bookings(&self) -> Result<Vec<RoomConflicts>> {
        let guest_names: HashMap<String, String> = self
            .stores
            .guests
            .list()
            .await?
            .into_iter()
            .map(|g| (g.id, g.name))
            .collect();

        let mut rooms = self.stores.rooms.list().await?;
        rooms.sort_by(|a, b| a.number.cmp(&b.number));

        let mut out = Vec::new();
        for room in rooms {
            let rows = self.stores.bookings.for_room(&room.id).await?;
            let set = conflicts::overlapping_set(&rows);
            if set.len() < 2 {
                continue;
            }
            let stays = set
                .into_iter()
                .map(|b| ConflictingStay {
                    booking_id: b.id.clone(),
                    guest_name: guest_names
                        .get(&b.guest_id)
                        .cloned()
                        .unwrap_or_else(|| b.guest_id.clone()),
                    check_in: b.check_in,
                    check_out: b.check_out,
                    status: b.status,
                })
                .collect();
            out.push(RoomConflicts {
                room_id: room.id,
                room_number: room.number,
                stays,
            });
        }
        Ok(out)
    }

    /// Settles a double-booking by cancelling one side through the normal
    /// lifecycle. Both bookings must be on the same room.
    pub async fn resolve_conflict(
        &self,
        keep_id: &str,
        cancel_id: &str,
        actor: &Actor,
    ) -> Result<Booking> {
        if keep_id == cancel_id {
            return Err(BookingError::Validation(
                "keep and cancel refer to the same booking".into(),
            ));
        }
        let keep = self
            .stores
            .bookings
            .get(keep_id)
            .await?
            .ok_or_else(|| BookingError::not_found("booking", keep_id))?;
        let cancel = self
            .stores
            .bookings
            .get(cancel_id)
            .await?
            .ok_or_else(|| BookingError::not_found("booking", cancel_id))?;
        if keep.room_id != cancel.room_id {
            return Err(BookingError::Validation(format!(
                "bookings {keep_id} and {cancel_id} are not on the same room"
            )));
        }

        self.update_booking_status(cancel_id, BookingStatus::Cancelled, actor)
            .await?;
        self.stores
            .bookings
            .get(keep_id)
            .await?
            .ok_or_else(|| BookingError::not_found("booking", keep_id))
    }

    /// The operational snapshot for one day: arrivals and departures due,
    /// who is in house, the room census, and the housekeeping backlog.
    pub async fn end_of_day_report(&self, date: NaiveDate) -> Result<EndOfDayReport> {
        let bookings = self.stores.bookings.list().await?;
        let guests: HashMap<String, Guest> = self
            .stores
            .guests
            .list()
            .await?
            .into_iter()
            .map(|g| (g.id.clone(), g))
            .collect();
        let rooms: HashMap<String, Room> = self
            .stores
            .rooms
            .list()
            .await?
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();
        let open_tasks = self
            .stores
            .housekeeping
            .list()
            .await?
            .iter()
            .filter(|t| t.status != TaskStatus::Done)
            .count();
        Ok(report::build(date, &bookings, &guests, &rooms, open_tasks))
    }

    /// Consumes the engine, draining the notification outbox.
    pub async fn shutdown(self) {
        self.outbox.close().await;
    }

    fn resolver(&self) -> IdentityResolver<'_> {
        IdentityResolver::new(
            self.stores.guests.as_ref(),
            self.stores.rooms.as_ref(),
            self.stores.properties.as_ref(),
            self.stores.room_types.as_ref(),
        )
    }

    async fn create_checked(
        &self,
        request: BookingRequest,
        group: Option<GroupMembership>,
        actor: &Actor,
    ) -> Result<Booking> {
        let stay = request.stay()?;
        if !matches!(
            request.status,
            BookingStatus::Reserved | BookingStatus::Confirmed
        ) {
            return Err(BookingError::Validation(format!(
                "a booking cannot start out {}",
                request.status
            )));
        }
        if request.num_guests == 0 {
            return Err(BookingError::Validation(
                "a booking needs at least one guest".into(),
            ));
        }

        let resolver = self.resolver();
        let guest = resolver.resolve_guest(&request.guest).await?;
        let room = resolver
            .resolve_room(&request.room_number, request.room_type_hint.as_deref())
            .await?;

        let existing = self.stores.bookings.for_guest(&guest.id).await?;
        if existing.iter().any(|b| {
            b.is_active()
                && b.room_id == room.id
                && b.check_in == stay.check_in
                && b.check_out == stay.check_out
        }) {
            return Err(BookingError::DuplicateBooking {
                guest_email: guest_label(&guest),
                room_number: room.number.clone(),
            });
        }

        if conflicts::has_overlap(self.stores.bookings.as_ref(), &room.id, stay, None).await? {
            return Err(BookingError::RoomUnavailable {
                room_number: room.number.clone(),
                check_in: stay.check_in,
                check_out: stay.check_out,
            });
        }

        let new = NewBooking {
            guest_id: guest.id.clone(),
            room_id: room.id.clone(),
            check_in: stay.check_in,
            check_out: stay.check_out,
            status: request.status,
            total_price: request.total_price,
            num_guests: request.num_guests,
            source: request.source,
            amount_paid: Money::ZERO,
            payment_status: PaymentStatus::Pending,
            notes: request.notes,
            group,
            created_by: Some(actor.name.clone()),
        };
        // The store re-checks the overlap under its own lock; losing that
        // race reads the same as finding the room taken up front.
        let booking = match self.stores.bookings.create(new).await {
            Ok(booking) => booking,
            Err(e) if e.is_constraint() => {
                return Err(BookingError::RoomUnavailable {
                    room_number: room.number.clone(),
                    check_in: stay.check_in,
                    check_out: stay.check_out,
                });
            }
            Err(e) => return Err(e),
        };

        if room.status.resettable_on_booking() && room.status != RoomStatus::Available {
            let mut room = room.clone();
            room.status = RoomStatus::Available;
            self.stores.rooms.update(room).await?;
        }

        let mut guest = guest;
        guest.record_stay(StaySnapshot {
            room_number: room.number.clone(),
            check_in: stay.check_in,
            check_out: stay.check_out,
            source: booking.source,
            revenue: booking.total_price,
            created_by: Some(actor.name.clone()),
            checked_in_by: None,
            checked_out_by: None,
            actual_check_out: None,
        });
        let guest = self.stores.guests.update(guest).await?;

        tracing::info!(
            booking_id = %booking.id,
            room = %room.number,
            guest = %guest.name,
            actor = %actor.id,
            "booking created"
        );
        self.outbox
            .enqueue(NotificationJob::BookingConfirmation(notice(
                &booking, &guest, &room,
            )));
        Ok(booking)
    }

    async fn on_check_out(&self, booking: &Booking) -> Result<()> {
        let room = self.stores.rooms.get(&booking.room_id).await?;
        let room_number = room
            .as_ref()
            .map(|r| r.number.clone())
            .unwrap_or_else(|| booking.room_id.clone());
        let guest = self.stores.guests.get(&booking.guest_id).await?;
        let guest_name = guest
            .as_ref()
            .map(|g| g.name.clone())
            .unwrap_or_else(|| booking.guest_id.clone());

        self.stores
            .housekeeping
            .create(NewTask {
                room_id: booking.room_id.clone(),
                note: format!("Turn over room {room_number} after {guest_name} checked out"),
            })
            .await?;

        if let Some(mut guest) = guest {
            guest.finalize_stay(StaySnapshot {
                room_number: room_number.clone(),
                check_in: booking.check_in,
                check_out: booking.check_out,
                source: booking.source,
                revenue: booking.total_price,
                created_by: booking.created_by.clone(),
                checked_in_by: booking.checked_in_by.clone(),
                checked_out_by: booking.checked_out_by.clone(),
                actual_check_out: booking.actual_check_out,
            });
            let guest = self.stores.guests.update(guest).await?;
            if let Some(room) = room {
                let invoice = InvoiceSummary {
                    total: booking.balance_due() + booking.amount_paid,
                    paid: booking.amount_paid,
                    balance: booking.balance_due(),
                };
                self.outbox.enqueue(NotificationJob::CheckOutNotice {
                    notice: notice(booking, &guest, &room),
                    invoice: Some(invoice),
                });
            }
        }
        Ok(())
    }

    async fn room_number(&self, room_id: &str) -> Result<String> {
        Ok(self
            .stores
            .rooms
            .get(room_id)
            .await?
            .map(|r| r.number)
            .unwrap_or_else(|| room_id.to_string()))
    }
}

fn notice(booking: &Booking, guest: &Guest, room: &Room) -> BookingNotice {
    BookingNotice {
        booking_id: booking.id.clone(),
        guest_name: guest.name.clone(),
        guest_email: guest.email.clone(),
        room_number: room.number.clone(),
        check_in: booking.check_in,
        check_out: booking.check_out,
    }
}

fn guest_label(guest: &Guest) -> String {
    if guest.email.is_empty() {
        guest.name.clone()
    } else {
        guest.email.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{GuestStore, HousekeepingTaskStore, RoomStore, RoomTypeStore};
    use crate::domain::room::{NewRoom, NewRoomType};
    use crate::infrastructure::in_memory::{
        InMemoryBookingStore, InMemoryGuestStore, InMemoryHousekeepingStore,
        InMemoryPropertyStore, InMemoryRoomStore, InMemoryRoomTypeStore,
    };
    use crate::infrastructure::notifier::{LogNotifier, RecordingNotifier, SentNotification};
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct Fixture {
        guests: InMemoryGuestStore,
        rooms: InMemoryRoomStore,
        bookings: InMemoryBookingStore,
        housekeeping: InMemoryHousekeepingStore,
        properties: InMemoryPropertyStore,
        room_types: InMemoryRoomTypeStore,
    }

    impl Fixture {
        fn stores(&self) -> Stores {
            Stores {
                guests: Box::new(self.guests.clone()),
                rooms: Box::new(self.rooms.clone()),
                bookings: Box::new(self.bookings.clone()),
                housekeeping: Box::new(self.housekeeping.clone()),
                properties: Box::new(self.properties.clone()),
                room_types: Box::new(self.room_types.clone()),
            }
        }

        fn engine(&self) -> ReservationEngine {
            ReservationEngine::new(
                self.stores(),
                NotificationOutbox::spawn(Box::new(LogNotifier)),
            )
        }

        async fn seed_room(&self, number: &str) {
            let room_type = match self.room_types.find_by_name("Double").await.unwrap() {
                Some(room_type) => room_type,
                None => self
                    .room_types
                    .create(NewRoomType {
                        name: "Double".into(),
                    })
                    .await
                    .unwrap(),
            };
            self.rooms
                .create(NewRoom {
                    number: number.into(),
                    room_type_id: room_type.id,
                    status: RoomStatus::Available,
                })
                .await
                .unwrap();
        }
    }

    fn request(email: &str, room: &str, check_in: &str, check_out: &str) -> BookingRequest {
        BookingRequest {
            guest: GuestProfile {
                name: "John Doe".into(),
                email: email.into(),
                phone: "555-0100".into(),
                address: String::new(),
            },
            room_number: room.into(),
            room_type_hint: None,
            check_in: check_in.parse().unwrap(),
            check_out: check_out.parse().unwrap(),
            status: BookingStatus::Confirmed,
            total_price: Money::new(dec!(200)),
            num_guests: 2,
            source: BookingSource::Reception,
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_booking_persists_and_aggregates() {
        let fx = Fixture::default();
        fx.seed_room("101").await;
        let engine = fx.engine();

        let booking = engine
            .create_booking(
                request("john@example.com", "101", "2025-03-01", "2025-03-05"),
                &Actor::new("s1", "Alice"),
            )
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.created_by.as_deref(), Some("Alice"));
        assert_eq!(booking.total_price, Money::new(dec!(200)));

        let guest = fx
            .guests
            .find_by_email("john@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(guest.total_stays, 1);
        assert_eq!(guest.total_revenue, Money::new(dec!(200)));
        assert_eq!(
            guest.last_stay.as_ref().map(|s| s.room_number.as_str()),
            Some("101")
        );
    }

    #[tokio::test]
    async fn test_identical_stay_is_a_duplicate() {
        let fx = Fixture::default();
        fx.seed_room("101").await;
        let engine = fx.engine();
        let actor = Actor::system();

        engine
            .create_booking(
                request("john@example.com", "101", "2025-03-01", "2025-03-05"),
                &actor,
            )
            .await
            .unwrap();
        let err = engine
            .create_booking(
                request("john@example.com", "101", "2025-03-01", "2025-03-05"),
                &actor,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::DuplicateBooking { .. }));
    }

    #[tokio::test]
    async fn test_check_in_requires_room_physically_free() {
        let fx = Fixture::default();
        fx.seed_room("101").await;
        let engine = fx.engine();
        let actor = Actor::system();

        let first = engine
            .create_booking(
                request("a@example.com", "101", "2025-03-01", "2025-03-05"),
                &actor,
            )
            .await
            .unwrap();
        let second = engine
            .create_booking(
                request("b@example.com", "101", "2025-03-05", "2025-03-08"),
                &actor,
            )
            .await
            .unwrap();

        engine
            .update_booking_status(&first.id, BookingStatus::CheckedIn, &actor)
            .await
            .unwrap();
        // Back-to-back dates are fine, but the first guest is still in the room.
        let err = engine
            .update_booking_status(&second.id, BookingStatus::CheckedIn, &actor)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::AlreadyOccupied(number) if number == "101"));
    }

    #[tokio::test]
    async fn test_delete_removes_guest_without_history() {
        let fx = Fixture::default();
        fx.seed_room("101").await;
        let engine = fx.engine();
        let actor = Actor::system();

        let booking = engine
            .create_booking(
                request("john@example.com", "101", "2025-03-01", "2025-03-05"),
                &actor,
            )
            .await
            .unwrap();
        engine.delete_booking(&booking.id, &actor).await.unwrap();

        assert!(
            fx.guests
                .find_by_email("john@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_check_out_notifies_with_invoice() {
        let fx = Fixture::default();
        fx.seed_room("101").await;
        let (notifier, sent) = RecordingNotifier::boxed();
        let engine = ReservationEngine::new(fx.stores(), NotificationOutbox::spawn(notifier));
        let actor = Actor::new("s1", "Alice");

        let booking = engine
            .create_booking(
                request("john@example.com", "101", "2025-03-01", "2025-03-05"),
                &actor,
            )
            .await
            .unwrap();
        engine
            .update_booking_status(&booking.id, BookingStatus::CheckedIn, &actor)
            .await
            .unwrap();
        engine
            .update_booking_status(&booking.id, BookingStatus::CheckedOut, &actor)
            .await
            .unwrap();
        engine.shutdown().await;

        let sent = sent.lock().await;
        assert_eq!(sent.len(), 3);
        match &sent[2] {
            SentNotification::CheckOut(notice, Some(invoice)) => {
                assert_eq!(notice.room_number, "101");
                assert_eq!(invoice.total, Money::new(dec!(200)));
                assert_eq!(invoice.balance, Money::new(dec!(200)));
            }
            other => panic!("unexpected notification: {other:?}"),
        }

        // Housekeeping picked up the turnover.
        let tasks = fx.housekeeping.list().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].note.contains("John Doe"));
    }
}
