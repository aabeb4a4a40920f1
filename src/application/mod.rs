//! Application layer orchestrating the booking lifecycle.
//!
//! `ReservationEngine` is the single entry point: it resolves guest and room
//! identities, enforces the lifecycle and overlap rules against the stores,
//! and queues guest notifications through the outbox.

pub mod conflicts;
pub mod dedup;
pub mod engine;
pub mod groups;
pub mod identity;
pub mod lifecycle;
pub mod outbox;
pub mod report;
