//! parlor gateway library entry.
//!
//! This crate wires the transport, session directory, and matching engine
//! into a cohesive relay stack. It is intended to be consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod directory;
pub mod router;
pub mod transport;
