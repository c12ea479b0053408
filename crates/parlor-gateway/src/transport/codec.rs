//! Decode-once codec for the transport layer.
//!
//! Text frames carry envelopes; binary frames are not part of the protocol
//! and are rejected before they reach session logic. Ping/Pong/Close are
//! surfaced for lifecycle management.

use axum::extract::ws::Message;

use parlor_core::error::{ParlorError, Result};
use parlor_core::protocol::envelope::Envelope;

#[derive(Debug)]
pub enum Inbound {
    Envelope(Envelope),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Text(s) => {
            let env = Envelope::from_json(&s)?;
            Ok(Inbound::Envelope(env))
        }
        Message::Binary(_) => Err(ParlorError::BadRequest(
            "binary frames not supported".into(),
        )),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(v) => Ok(Inbound::Pong(v)),
        Message::Close(_) => Ok(Inbound::Close),
    }
}
