use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use parlor_core::protocol::envelope::Envelope;
use parlor_core::Result;

use crate::directory::connection::ConnectionHandle;

/// One seated member: their connection plus the last-known envelope.
#[derive(Clone)]
pub struct Member {
    pub conn: Arc<dyn ConnectionHandle>,
    pub profile: Envelope,
}

/// Table directory: `table id -> members`.
///
/// Tables come into existence on first `join` and never persist empty: the
/// last `leave` removes the table itself.
#[derive(Default)]
pub struct TableDirectory {
    tables: DashMap<String, DashMap<String, Member>>,
}

impl TableDirectory {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    /// Seat a member, creating the table atomically if absent.
    pub fn join(&self, table: &str, user: &str, member: Member) {
        self.tables
            .entry(table.to_string())
            .or_insert_with(DashMap::new)
            .insert(user.to_string(), member);
    }

    /// Unseat a member. The member count is read before removal: at one or
    /// fewer members the whole table is dropped, otherwise only this seat.
    /// A two-member table therefore shrinks to a size-1 table rather than
    /// dissolving; that threshold is intentional, see `leave` tests.
    ///
    /// The entry guard is held across the count and the removal, so a
    /// concurrent `join` on the same table cannot seat a member into a
    /// table that is being dropped.
    pub fn leave(&self, table: &str, user: &str) {
        if let Entry::Occupied(entry) = self.tables.entry(table.to_string()) {
            if entry.get().len() <= 1 {
                entry.remove();
            } else {
                entry.get().remove(user);
            }
        }
    }

    /// Serialize once, deliver to every seat (unicast falls out when the
    /// table has one member). An absent table is a normal no-op, not a
    /// fault: it may have dissolved concurrently.
    pub fn broadcast(&self, table: &str, env: &Envelope) -> Result<()> {
        let text = env.to_json()?;
        if let Some(members) = self.tables.get(table) {
            for m in members.iter() {
                m.value().conn.deliver(text.clone());
            }
        }
        Ok(())
    }

    /// Member count, 0 if the table is absent.
    pub fn size(&self, table: &str) -> usize {
        self.tables.get(table).map(|m| m.len()).unwrap_or(0)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }
}
