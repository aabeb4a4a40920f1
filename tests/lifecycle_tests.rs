mod common;

use common::{desk, harness, request};
use frontdesk::domain::booking::BookingStatus;
use frontdesk::domain::ports::{BookingStore, GuestStore, HousekeepingTaskStore, RoomStore};
use frontdesk::domain::room::RoomStatus;
use frontdesk::error::BookingError;
use frontdesk::infrastructure::notifier::SentNotification;

#[tokio::test]
async fn test_full_stay_flow() {
    let h = harness().await;
    let actor = desk();

    let booking = h
        .engine
        .create_booking(
            request("John Doe", "john@example.com", "101", "2025-03-01", "2025-03-05"),
            &actor,
        )
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.created_by.as_deref(), Some("Front Desk"));

    let checked_in = h
        .engine
        .update_booking_status(&booking.id, BookingStatus::CheckedIn, &actor)
        .await
        .unwrap();
    assert_eq!(checked_in.checked_in_by.as_deref(), Some("Front Desk"));
    assert!(checked_in.actual_check_in.is_some());
    let room = h.rooms.find_by_number("101").await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Occupied);

    let checked_out = h
        .engine
        .update_booking_status(&booking.id, BookingStatus::CheckedOut, &actor)
        .await
        .unwrap();
    assert!(checked_out.actual_check_out.is_some());
    let room = h.rooms.find_by_number("101").await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Cleaning);

    // Check-out leaves a turnover task and durable guest history.
    let tasks = h.housekeeping.list().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].note.contains("John Doe"));
    let guest = h
        .guests
        .find_by_email("john@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(guest.has_checked_out);
    assert_eq!(guest.total_stays, 1);

    // Every step notified the guest, the departure with an invoice.
    h.engine.shutdown().await;
    let sent = h.sent.lock().await;
    assert_eq!(sent.len(), 3);
    match &sent[2] {
        SentNotification::CheckOut(notice, invoice) => {
            assert_eq!(notice.room_number, "101");
            assert!(invoice.is_some());
        }
        other => panic!("expected a check-out notice, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancel_releases_an_occupied_room() {
    let h = harness().await;
    let actor = desk();

    let booking = h
        .engine
        .create_booking(
            request("Jane Roe", "jane@example.com", "102", "2025-03-01", "2025-03-05"),
            &actor,
        )
        .await
        .unwrap();
    h.engine
        .update_booking_status(&booking.id, BookingStatus::CheckedIn, &actor)
        .await
        .unwrap();

    let cancelled = h
        .engine
        .update_booking_status(&booking.id, BookingStatus::Cancelled, &actor)
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    let room = h.rooms.find_by_number("102").await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Available);
}

#[tokio::test]
async fn test_terminal_states_are_closed() {
    let h = harness().await;
    let actor = desk();

    let booking = h
        .engine
        .create_booking(
            request("John Doe", "john@example.com", "101", "2025-03-01", "2025-03-03"),
            &actor,
        )
        .await
        .unwrap();
    h.engine
        .update_booking_status(&booking.id, BookingStatus::Cancelled, &actor)
        .await
        .unwrap();

    let err = h
        .engine
        .update_booking_status(&booking.id, BookingStatus::CheckedIn, &actor)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_check_out_requires_being_checked_in() {
    let h = harness().await;
    let actor = desk();

    let booking = h
        .engine
        .create_booking(
            request("John Doe", "john@example.com", "101", "2025-03-01", "2025-03-03"),
            &actor,
        )
        .await
        .unwrap();

    let err = h
        .engine
        .update_booking_status(&booking.id, BookingStatus::CheckedOut, &actor)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::CannotCheckOut(id) if id == booking.id));
}

#[tokio::test]
async fn test_checked_in_booking_cannot_be_deleted() {
    let h = harness().await;
    let actor = desk();

    let booking = h
        .engine
        .create_booking(
            request("John Doe", "john@example.com", "101", "2025-03-01", "2025-03-03"),
            &actor,
        )
        .await
        .unwrap();
    h.engine
        .update_booking_status(&booking.id, BookingStatus::CheckedIn, &actor)
        .await
        .unwrap();

    let err = h.engine.delete_booking(&booking.id, &actor).await.unwrap_err();
    assert!(matches!(err, BookingError::CannotDelete(_)));

    // Still deletable after the stay completes.
    h.engine
        .update_booking_status(&booking.id, BookingStatus::CheckedOut, &actor)
        .await
        .unwrap();
    h.engine.delete_booking(&booking.id, &actor).await.unwrap();
    assert!(h.bookings.get(&booking.id).await.unwrap().is_none());

    // The guest completed a stay, so the identity outlives the booking row.
    assert!(h
        .guests
        .find_by_email("john@example.com")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_deleting_only_booking_of_new_guest_removes_the_guest() {
    let h = harness().await;
    let actor = desk();

    let booking = h
        .engine
        .create_booking(
            request("Jane Roe", "jane@example.com", "102", "2025-03-01", "2025-03-03"),
            &actor,
        )
        .await
        .unwrap();
    h.engine.delete_booking(&booking.id, &actor).await.unwrap();

    assert!(h
        .guests
        .find_by_email("jane@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_booking_never_resets_occupied_or_maintenance_room() {
    let h = harness().await;
    let actor = desk();

    let mut room = h.rooms.find_by_number("103").await.unwrap().unwrap();
    room.status = RoomStatus::Maintenance;
    h.rooms.update(room).await.unwrap();

    h.engine
        .create_booking(
            request("John Doe", "john@example.com", "103", "2025-03-01", "2025-03-03"),
            &actor,
        )
        .await
        .unwrap();

    // The future booking must not pull the room out of maintenance.
    let room = h.rooms.find_by_number("103").await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Maintenance);

    // A cleaning room, on the other hand, is reset for the new stay.
    let mut room = h.rooms.find_by_number("102").await.unwrap().unwrap();
    room.status = RoomStatus::Cleaning;
    h.rooms.update(room).await.unwrap();
    h.engine
        .create_booking(
            request("Jane Roe", "jane@example.com", "102", "2025-03-01", "2025-03-03"),
            &actor,
        )
        .await
        .unwrap();
    let room = h.rooms.find_by_number("102").await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Available);
}

#[tokio::test]
async fn test_returning_guest_is_resolved_not_duplicated() {
    let h = harness().await;
    let actor = desk();

    let first = h
        .engine
        .create_booking(
            request("John Doe", "john@example.com", "101", "2025-03-01", "2025-03-03"),
            &actor,
        )
        .await
        .unwrap();
    let second = h
        .engine
        .create_booking(
            request("John Doe", "JOHN@Example.com", "102", "2025-04-01", "2025-04-03"),
            &actor,
        )
        .await
        .unwrap();

    assert_eq!(first.guest_id, second.guest_id);
    assert_eq!(h.guests.list().await.unwrap().len(), 1);
    let guest = h.guests.get(&first.guest_id).await.unwrap().unwrap();
    assert_eq!(guest.total_stays, 2);
}
