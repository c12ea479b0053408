//! Session directory & matching engine behavior tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use parlor_core::protocol::envelope::Envelope;
use parlor_gateway::directory::{ConnectionHandle, SessionDirectory};

/// Test handle that records everything delivered to it.
#[derive(Default)]
struct RecordingConn {
    sent: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl RecordingConn {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl ConnectionHandle for RecordingConn {
    fn deliver(&self, text: String) {
        self.sent.lock().unwrap().push(text);
    }

    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }
}

fn env(table: &str, id: &str) -> Envelope {
    Envelope {
        table: table.into(),
        id: id.into(),
        name: format!("name-{id}"),
        message: "hello".into(),
    }
}

fn directory() -> SessionDirectory {
    SessionDirectory::new(None, "match")
}

#[test]
fn join_then_lookup_returns_table() {
    let dir = directory();
    dir.register("a", "t1");
    dir.join("t1", "a", RecordingConn::new(), env("t1", "a"));
    assert_eq!(dir.lookup("a").as_deref(), Some("t1"));
}

#[test]
fn join_reassigns_existing_login() {
    let dir = directory();
    dir.register("a", "t1");
    dir.join("t1", "a", RecordingConn::new(), env("t1", "a"));
    dir.join("t2", "a", RecordingConn::new(), env("t2", "a"));
    assert_eq!(dir.lookup("a").as_deref(), Some("t2"));
}

#[test]
fn join_without_register_leaves_login_untouched() {
    let dir = directory();
    dir.join("t1", "ghost", RecordingConn::new(), env("t1", "ghost"));
    // seated, but the login registry never knew this user
    assert_eq!(dir.tables.size("t1"), 1);
    assert_eq!(dir.lookup("ghost"), None);
}

#[test]
fn reassign_is_noop_for_unregistered_user() {
    let dir = directory();
    assert!(!dir.login.reassign("ghost", "t1"));
    assert_eq!(dir.lookup("ghost"), None);
}

#[test]
fn leave_sole_member_drops_table() {
    let dir = directory();
    dir.register("a", "t1");
    dir.join("t1", "a", RecordingConn::new(), env("t1", "a"));
    dir.leave("t1", "a");
    assert!(!dir.tables.contains("t1"));
    assert_eq!(dir.tables.size("t1"), 0);
}

#[test]
fn leave_with_two_members_removes_only_the_leaver() {
    let dir = directory();
    let (ca, cb) = (RecordingConn::new(), RecordingConn::new());
    dir.register("a", "t1");
    dir.register("b", "t1");
    dir.join("t1", "a", ca.clone(), env("t1", "a"));
    dir.join("t1", "b", cb.clone(), env("t1", "b"));

    dir.leave("t1", "a");

    // size was 2 before removal, so the table survives at size 1
    assert!(dir.tables.contains("t1"));
    assert_eq!(dir.tables.size("t1"), 1);

    dir.broadcast("t1", &env("t1", "b")).unwrap();
    assert!(ca.sent().is_empty());
    assert_eq!(cb.sent().len(), 1);
}

#[test]
fn leave_absent_table_is_noop() {
    let dir = directory();
    dir.leave("nope", "a");
    assert!(!dir.tables.contains("nope"));
}

#[test]
fn broadcast_reaches_every_member() {
    let dir = directory();
    let (ca, cb) = (RecordingConn::new(), RecordingConn::new());
    dir.register("a", "t1");
    dir.register("b", "t1");
    dir.join("t1", "a", ca.clone(), env("t1", "a"));
    dir.join("t1", "b", cb.clone(), env("t1", "b"));

    let msg = env("t1", "a");
    dir.broadcast("t1", &msg).unwrap();

    for conn in [&ca, &cb] {
        let sent = conn.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(Envelope::from_json(&sent[0]).unwrap(), msg);
    }
}

#[test]
fn broadcast_absent_table_is_noop() {
    let dir = directory();
    dir.broadcast("nope", &env("nope", "a")).unwrap();
}

#[test]
fn queue_is_fifo() {
    let dir = directory();
    for id in ["a", "b", "c"] {
        dir.enqueue(RecordingConn::new(), env("", id));
    }
    assert_eq!(dir.queue.len(), 3);
    assert_eq!(dir.dequeue().unwrap().profile.id, "a");
    assert_eq!(dir.dequeue().unwrap().profile.id, "b");
    assert_eq!(dir.dequeue().unwrap().profile.id, "c");
    assert!(dir.dequeue().is_none());
}

#[test]
fn dequeue_skips_closed_connections() {
    let dir = directory();
    let stale = RecordingConn::new();
    stale.close();
    dir.enqueue(stale, env("", "gone"));
    dir.enqueue(RecordingConn::new(), env("", "alive"));

    assert_eq!(dir.dequeue().unwrap().profile.id, "alive");
    assert!(dir.queue.is_empty());
}

#[test]
fn bounded_queue_refuses_when_full() {
    let dir = SessionDirectory::new(Some(1), "match");
    assert!(dir.enqueue(RecordingConn::new(), env("", "a")));
    assert!(!dir.enqueue(RecordingConn::new(), env("", "b")));
    assert_eq!(dir.queue.len(), 1);
}

#[test]
fn mint_table_id_is_prefixed_and_unique() {
    let dir = directory();
    assert_eq!(dir.mint_table_id(), "match-1");
    assert_eq!(dir.mint_table_id(), "match-2");
}

#[test]
fn disconnect_clears_login_and_table() {
    let dir = directory();
    dir.register("a", "t1");
    dir.join("t1", "a", RecordingConn::new(), env("t1", "a"));
    dir.disconnect("a");
    assert_eq!(dir.lookup("a"), None);
    assert!(!dir.tables.contains("t1"));
}

#[test]
fn concurrent_joins_do_not_lose_members() {
    let dir = Arc::new(directory());
    let mut handles = Vec::new();
    for i in 0..16 {
        let dir = Arc::clone(&dir);
        handles.push(thread::spawn(move || {
            let user = format!("u{i}");
            dir.register(&user, "shared");
            dir.join("shared", &user, RecordingConn::new(), env("shared", &user));
        }));
    }
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(dir.tables.size("shared"), 16);
    for i in 0..16 {
        assert_eq!(dir.lookup(&format!("u{i}")).as_deref(), Some("shared"));
    }
}

#[test]
fn concurrent_join_and_leave_keep_own_member_seated() {
    // join and leave racing on one table: between a thread's own join and
    // its own leave, its member must be seated, so the table can never
    // read as empty at that point
    let dir = Arc::new(directory());
    let mut handles = Vec::new();
    for i in 0..4 {
        let dir = Arc::clone(&dir);
        handles.push(thread::spawn(move || {
            let user = format!("u{i}");
            dir.register(&user, "t");
            for round in 0..300 {
                dir.join("t", &user, RecordingConn::new(), env("t", &user));
                assert!(
                    dir.tables.size("t") >= 1,
                    "{user} round {round}: own member lost right after join"
                );
                dir.leave("t", &user);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn disconnect_of_dead_peer_leaves_partner_seated() {
    let dir = directory();
    let (ca, cb) = (RecordingConn::new(), RecordingConn::new());
    dir.register("a", "t1");
    dir.register("b", "t1");
    dir.join("t1", "a", ca.clone(), env("t1", "a"));
    dir.join("t1", "b", cb.clone(), env("t1", "b"));

    // b's socket died right after being seated
    cb.close();
    dir.disconnect("b");

    assert!(dir.tables.contains("t1"));
    assert_eq!(dir.tables.size("t1"), 1);
    assert_eq!(dir.lookup("b"), None);
    assert_eq!(dir.lookup("a").as_deref(), Some("t1"));

    dir.broadcast("t1", &env("t1", "a")).unwrap();
    assert_eq!(ca.sent().len(), 1);
    assert!(cb.sent().is_empty());
}

#[test]
fn matching_two_waiting_users_scenario() {
    let dir = directory();
    let (ca, cb) = (RecordingConn::new(), RecordingConn::new());
    dir.enqueue(ca.clone(), env("", "a"));
    dir.enqueue(cb.clone(), env("", "b"));

    // pairing policy, as the transport handler runs it
    let first = dir.dequeue().unwrap();
    let second = dir.dequeue().unwrap();
    assert_eq!(first.profile.id, "a");
    assert_eq!(second.profile.id, "b");

    let table = dir.mint_table_id();
    for w in [&first, &second] {
        dir.register(&w.profile.id, &table);
        dir.join(
            &table,
            &w.profile.id,
            Arc::clone(&w.conn),
            w.profile.clone().with_table(table.clone()),
        );
    }

    assert_eq!(dir.tables.size(&table), 2);
    assert_eq!(dir.lookup("a").as_deref(), Some(table.as_str()));
    assert_eq!(dir.lookup("b").as_deref(), Some(table.as_str()));

    dir.broadcast(&table, &env(&table, "a")).unwrap();
    assert_eq!(ca.sent().len(), 1);
    assert_eq!(cb.sent().len(), 1);
}
