//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handlers and the codec that decodes messages once
//! before they reach session logic.

pub mod codec;
pub mod ws;
