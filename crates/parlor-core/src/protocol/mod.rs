//! Protocol modules (envelope wire format).
//!
//! All parsers are panic-free: malformed input is reported as `ParlorError`
//! instead of panicking, keeping the relay resilient to hostile traffic.

pub mod envelope;
