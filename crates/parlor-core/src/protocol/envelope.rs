//! Chat envelope (JSON wire format).
//!
//! One record type crosses the wire in both directions: `{table, id, name,
//! message}`. Field names match the wire exactly, so no serde renames.

use serde::{Deserialize, Serialize};

use crate::error::{ParlorError, Result};

/// Chat message unit exchanged between client and relay.
///
/// `table` may be empty, meaning the sender is not seated at a table yet
/// (e.g. the first frame on the matching endpoint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Table (room) id; empty = unassigned.
    #[serde(default)]
    pub table: String,
    /// User id, unique per connection.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Payload text.
    pub message: String,
}

impl Envelope {
    /// Parse wire text. Malformed JSON or a missing required field fails;
    /// unknown fields are ignored.
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| ParlorError::MalformedEnvelope(e.to_string()))
    }

    /// Serialize to wire text.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ParlorError::Internal(format!("envelope encode failed: {e}")))
    }

    /// Same envelope re-stamped with a table id (used when seating a matched
    /// user into a freshly minted table).
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }
}
