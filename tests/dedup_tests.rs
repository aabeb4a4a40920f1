mod common;

use common::{booking_row, legacy_harness};
use frontdesk::domain::booking::BookingStatus;
use frontdesk::domain::guest::{GuestProfile, NewGuest};
use frontdesk::domain::ports::{BookingStore, GuestStore, RoomStore};

#[tokio::test]
async fn test_replayed_rows_collapse_to_the_furthest_progressed() {
    let h = legacy_harness().await;

    let alice = h
        .guests
        .create(NewGuest::from_profile(&GuestProfile {
            name: "Alice Ng".into(),
            email: "alice@example.com".into(),
            ..Default::default()
        }))
        .await
        .unwrap();
    let room = h.rooms.find_by_number("101").await.unwrap().unwrap();

    // The same stay recorded three times by a replayed feed.
    for (id, status) in [
        ("b1", BookingStatus::Reserved),
        ("b2", BookingStatus::CheckedIn),
        ("b3", BookingStatus::Confirmed),
    ] {
        h.bookings
            .put(booking_row(id, &alice.id, &room.id, "2025-03-01", "2025-03-05", status))
            .await;
    }
    let other = h.rooms.find_by_number("102").await.unwrap().unwrap();
    h.bookings
        .put(booking_row(
            "b4",
            &alice.id,
            &other.id,
            "2025-02-20",
            "2025-02-22",
            BookingStatus::CheckedOut,
        ))
        .await;

    let view = h.engine.all_bookings().await.unwrap();
    let ids: Vec<&str> = view.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["b4", "b2"]);

    // The view arbitrates; it does not rewrite the store.
    assert_eq!(h.bookings.list().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_ledger_joins_over_the_deduped_view() {
    let h = legacy_harness().await;

    let alice = h
        .guests
        .create(NewGuest::from_profile(&GuestProfile {
            name: "Alice Ng".into(),
            email: "alice@example.com".into(),
            ..Default::default()
        }))
        .await
        .unwrap();
    let room = h.rooms.find_by_number("101").await.unwrap().unwrap();
    h.bookings
        .put(booking_row(
            "b1",
            &alice.id,
            &room.id,
            "2025-03-01",
            "2025-03-05",
            BookingStatus::Reserved,
        ))
        .await;
    h.bookings
        .put(booking_row(
            "b2",
            &alice.id,
            &room.id,
            "2025-03-01",
            "2025-03-05",
            BookingStatus::Confirmed,
        ))
        .await;

    let entries = h.engine.booking_ledger().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].room, "101");
    assert_eq!(entries[0].guest, "Alice Ng");
    assert_eq!(entries[0].email, "alice@example.com");
    assert_eq!(entries[0].nights, 4);
    assert_eq!(entries[0].status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn test_orphaned_ids_pass_through_unjoined() {
    let h = legacy_harness().await;

    h.bookings
        .put(booking_row(
            "b1",
            "guest-gone",
            "room-gone",
            "2025-03-01",
            "2025-03-03",
            BookingStatus::Reserved,
        ))
        .await;

    let view = h.engine.all_bookings().await.unwrap();
    assert_eq!(view.len(), 1);

    let entries = h.engine.booking_ledger().await.unwrap();
    assert_eq!(entries[0].room, "room-gone");
    assert_eq!(entries[0].guest, "guest-gone");
    assert_eq!(entries[0].email, "");
}
