//! Inbound and outbound text interfaces.

pub mod csv;
