//! Domain entities, value objects, and the ports the engine consumes.

pub mod actor;
pub mod booking;
pub mod group;
pub mod guest;
pub mod housekeeping;
pub mod ports;
pub mod room;
