//! WebSocket handlers.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS
//! - Lifecycle: ping/pong + idle timeout
//! - Cheap frame-length check before decode
//! - Drive the session directory from connection events
//!
//! Two endpoints share one session loop and differ only in how an inbound
//! envelope is applied:
//! - `/v1/chat`: the envelope's `table` field names the room; the first
//!   envelope from a connection doubles as login (register + join).
//! - `/v1/match`: the table is assigned by pairing two waiting users off
//!   the FIFO into a freshly minted table. Pairing policy lives here, not
//!   in the queue.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use parlor_core::error::Result;
use parlor_core::protocol::envelope::Envelope;

use crate::app_state::AppState;
use crate::directory::{ConnectionHandle, WsConnection};
use crate::transport::codec::{decode, Inbound};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Chat,
    Match,
}

/// Session-local view. The directory is the source of truth; `waiting` only
/// mirrors that this connection enqueued itself and has not yet seen proof
/// of a match (the peer's handler may have seated us in the meantime).
struct SessionState {
    user: Option<String>,
    waiting: bool,
    last_activity: Instant,
}

/// System notices reuse the envelope wire shape.
fn sys_notice(message: &str) -> String {
    json!({
        "table": "",
        "id": "system",
        "name": "system",
        "message": message
    })
    .to_string()
}

fn frame_len(msg: &Message) -> usize {
    match msg {
        Message::Text(s) => s.as_bytes().len(),
        Message::Binary(b) => b.len(),
        Message::Ping(v) => v.len(),
        Message::Pong(v) => v.len(),
        Message::Close(_) => 0,
    }
}

pub async fn chat_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = run_session(app, socket, Endpoint::Chat).await {
            tracing::debug!(error = %e, "chat session ended with error");
        }
    })
}

pub async fn match_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = run_session(app, socket, Endpoint::Match).await {
            tracing::debug!(error = %e, "match session ended with error");
        }
    })
}

async fn run_session(app: AppState, socket: WebSocket, endpoint: Endpoint) -> Result<()> {
    // ---- outbound channel; the directory sees only the handle
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(1024);
    let conn: Arc<dyn ConnectionHandle> = Arc::new(WsConnection::new(out_tx.clone()));

    // ---- split socket
    let (mut ws_tx, mut ws_rx) = socket.split();

    // ---- timers
    let gw = &app.cfg().gateway;
    let ping_every = Duration::from_millis(gw.ping_interval_ms);
    let idle_timeout = Duration::from_millis(gw.idle_timeout_ms);
    let max_frame = gw.max_frame_bytes;

    let mut ping_tick = tokio::time::interval(ping_every);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut sess = SessionState {
        user: None,
        waiting: false,
        last_activity: Instant::now(),
    };

    tracing::info!(?endpoint, "session opened");

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(m) => {
                        if ws_tx.send(m).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let Ok(msg) = incoming else { break; };

                sess.last_activity = Instant::now();

                // cheap-first: length check before decode
                if frame_len(&msg) > max_frame {
                    let _ = out_tx.send(Message::Text(sys_notice("frame too large"))).await;
                    continue;
                }

                match decode(msg) {
                    Ok(Inbound::Envelope(env)) => {
                        apply_envelope(&app, &conn, &out_tx, &mut sess, endpoint, env).await?;
                    }
                    Ok(Inbound::Ping(payload)) => {
                        let _ = out_tx.send(Message::Pong(payload)).await;
                    }
                    Ok(Inbound::Pong(_)) => {}
                    Ok(Inbound::Close) => break,
                    Err(e) => {
                        // malformed input never kills the session
                        let _ = out_tx.send(Message::Text(sys_notice(e.client_code().as_str()))).await;
                    }
                }
            }

            // ping
            _ = ping_tick.tick() => {
                let _ = out_tx.send(Message::Ping(Vec::new())).await;
            }

            // idle timeout
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                if sess.last_activity.elapsed() >= idle_timeout {
                    let _ = out_tx.send(Message::Text(sys_notice("idle timeout"))).await;
                    break;
                }
            }
        }
    }

    // disconnect is the only cancellation signal; clean up promptly.
    // A still-queued match entry is reaped lazily at dequeue time.
    if let Some(user) = sess.user.take() {
        app.directory().disconnect(&user);
        tracing::info!(user = %user, "session closed");
    } else {
        tracing::info!(?endpoint, "session closed before login");
    }

    Ok(())
}

/// Apply one inbound envelope to the directory.
async fn apply_envelope(
    app: &AppState,
    conn: &Arc<dyn ConnectionHandle>,
    out_tx: &mpsc::Sender<Message>,
    sess: &mut SessionState,
    endpoint: Endpoint,
    env: Envelope,
) -> Result<()> {
    let dir = app.directory();

    if env.id.is_empty() {
        let _ = out_tx.send(Message::Text(sys_notice("missing user id"))).await;
        return Ok(());
    }

    // already registered somewhere: relay into the current table. This also
    // covers a waiting user whose peer seated them since the last frame.
    if let Some(table) = dir.lookup(&env.id) {
        sess.user.get_or_insert_with(|| env.id.clone());
        sess.waiting = false;
        dir.broadcast(&table, &env.with_table(table.clone()))?;
        return Ok(());
    }

    match endpoint {
        Endpoint::Chat => {
            if env.table.is_empty() {
                let _ = out_tx.send(Message::Text(sys_notice("missing table"))).await;
                return Ok(());
            }
            // first envelope doubles as login
            dir.register(&env.id, &env.table);
            dir.join(&env.table, &env.id, Arc::clone(conn), env.clone());
            sess.user = Some(env.id.clone());
            tracing::debug!(user = %env.id, table = %env.table, "seated at table");
            dir.broadcast(&env.table, &env)?;
        }
        Endpoint::Match => {
            if sess.waiting {
                // enqueued and not yet paired; nothing to relay into
                let _ = out_tx.send(Message::Text(sys_notice("waiting for a match"))).await;
                return Ok(());
            }
            match dir.dequeue() {
                Some(peer) => {
                    let table = dir.mint_table_id();
                    dir.register(&peer.profile.id, &table);
                    dir.register(&env.id, &table);

                    let peer_env = peer.profile.clone().with_table(table.clone());
                    let own_env = env.clone().with_table(table.clone());

                    dir.join(&table, &peer.profile.id, Arc::clone(&peer.conn), peer_env.clone());
                    dir.join(&table, &env.id, Arc::clone(conn), own_env.clone());

                    // the peer may have vanished between dequeue's liveness
                    // check and being seated; their session never registered
                    // while waiting, so its cleanup missed this seat. Undo it.
                    if !peer.conn.is_open() {
                        dir.disconnect(&peer.profile.id);
                        tracing::debug!(peer = %peer.profile.id, table = %table, "matched peer gone, unseated");
                    }

                    sess.user = Some(env.id.clone());
                    tracing::debug!(user = %env.id, peer = %peer.profile.id, table = %table, "matched");

                    // each side learns who it was paired with
                    dir.broadcast(&table, &peer_env)?;
                    dir.broadcast(&table, &own_env)?;
                }
                None => {
                    if dir.enqueue(Arc::clone(conn), env.clone()) {
                        sess.user = Some(env.id.clone());
                        sess.waiting = true;
                        tracing::debug!(user = %env.id, "enqueued for matching");
                    } else {
                        let _ = out_tx.send(Message::Text(sys_notice("match queue full"))).await;
                    }
                }
            }
        }
    }

    Ok(())
}
