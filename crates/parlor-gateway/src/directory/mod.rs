//! Session directory & matching engine.
//!
//! Three internally synchronized components, constructed once at process
//! start and shared behind `Arc`: the login registry (`user -> table`), the
//! table directory (`table -> members`), and the matching FIFO. No statics;
//! the transport layer reaches them through `SessionDirectory`. Pairing
//! policy itself lives in the transport handlers, keeping it swappable.
//!
//! Every operation here is synchronous, short, and non-blocking; callers
//! invoke them straight from their connection task. There is no transaction
//! across components: `join`'s reassign is not rolled back if a caller
//! bails afterwards, idempotent re-application is the mitigation.

mod connection;
mod login;
mod queue;
mod tables;

pub use connection::{ConnectionHandle, WsConnection};
pub use login::LoginRegistry;
pub use queue::{MatchQueue, Waiting};
pub use tables::{Member, TableDirectory};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parlor_core::protocol::envelope::Envelope;
use parlor_core::Result;

/// Process-wide session state, handler-callable.
pub struct SessionDirectory {
    pub login: Arc<LoginRegistry>,
    pub tables: Arc<TableDirectory>,
    pub queue: Arc<MatchQueue>,
    table_seq: AtomicU64,
    table_id_prefix: String,
}

impl SessionDirectory {
    pub fn new(queue_capacity: Option<usize>, table_id_prefix: impl Into<String>) -> Self {
        Self {
            login: Arc::new(LoginRegistry::new()),
            tables: Arc::new(TableDirectory::new()),
            queue: Arc::new(MatchQueue::with_capacity(queue_capacity)),
            table_seq: AtomicU64::new(1),
            table_id_prefix: table_id_prefix.into(),
        }
    }

    /// Unconditional login entry. The connect path must call this before a
    /// user can be committed to a table.
    pub fn register(&self, user: &str, table: &str) {
        self.login.register(user, table);
    }

    pub fn lookup(&self, user: &str) -> Option<String> {
        self.login.lookup(user)
    }

    /// Seat a member, then confirm the login entry points at this table.
    /// A user that was never registered is seated but stays unknown to the
    /// login registry; upholding register-before-join is the caller's
    /// contract, violations are silent.
    pub fn join(
        &self,
        table: &str,
        user: &str,
        conn: Arc<dyn ConnectionHandle>,
        profile: Envelope,
    ) {
        self.tables.join(table, user, Member { conn, profile });
        if !self.login.reassign(user, table) {
            tracing::debug!(user, table, "join for unregistered user, login untouched");
        }
    }

    pub fn leave(&self, table: &str, user: &str) {
        self.tables.leave(table, user);
    }

    /// Disconnect cleanup: unseat from the current table and drop the login
    /// entry. Safe to call for unknown users.
    pub fn disconnect(&self, user: &str) {
        if let Some(table) = self.login.lookup(user) {
            self.tables.leave(&table, user);
            tracing::debug!(user, table = %table, "left table on disconnect");
        }
        self.login.unregister(user);
    }

    pub fn broadcast(&self, table: &str, env: &Envelope) -> Result<()> {
        self.tables.broadcast(table, env)
    }

    /// Append a user to the matching FIFO. Returns false when a configured
    /// capacity is exhausted.
    pub fn enqueue(&self, conn: Arc<dyn ConnectionHandle>, profile: Envelope) -> bool {
        self.queue.enqueue(Waiting { conn, profile })
    }

    /// Next live waiting user, in enqueue order. Entries whose connection
    /// has already closed are discarded on the way; their session never got
    /// matched and nobody else will reap them.
    pub fn dequeue(&self) -> Option<Waiting> {
        loop {
            let w = self.queue.dequeue()?;
            if w.conn.is_open() {
                return Some(w);
            }
            tracing::debug!(user = %w.profile.id, "dropping stale queue entry");
        }
    }

    /// Freshly minted table id for a matched pair.
    pub fn mint_table_id(&self) -> String {
        let n = self.table_seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.table_id_prefix, n)
    }
}
