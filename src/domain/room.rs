use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical state of a room.
///
/// Set only by the lifecycle transitions or explicit staff action. A new
/// booking must never pull a room out of `Occupied` or `Maintenance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Cleaning,
    Maintenance,
}

impl RoomStatus {
    /// True when a freshly created booking may reset the room to `Available`.
    pub fn resettable_on_booking(self) -> bool {
        matches!(self, Self::Available | Self::Cleaning)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Cleaning => "cleaning",
            Self::Maintenance => "maintenance",
        };
        f.write_str(s)
    }
}

/// A bookable room. `number` is the natural key every caller uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub number: String,
    pub room_type_id: String,
    pub status: RoomStatus,
}

/// Creation payload; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoom {
    pub number: String,
    pub room_type_id: String,
    pub status: RoomStatus,
}

impl NewRoom {
    pub(crate) fn into_room(self, id: String) -> Room {
        Room {
            id,
            number: self.number,
            room_type_id: self.room_type_id,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomType {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoomType {
    pub name: String,
}

impl NewRoomType {
    pub(crate) fn into_room_type(self, id: String) -> RoomType {
        RoomType {
            id,
            name: self.name,
        }
    }
}

/// External property-management record for a physical unit. Consulted when a
/// booking names a room the engine has never seen, to synthesize the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub number: String,
    pub room_type_id: Option<String>,
    pub room_type_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProperty {
    pub number: String,
    pub room_type_id: Option<String>,
    pub room_type_name: Option<String>,
}

impl NewProperty {
    pub(crate) fn into_property(self, id: String) -> Property {
        Property {
            id,
            number: self.number,
            room_type_id: self.room_type_id,
            room_type_name: self.room_type_name,
        }
    }
}
