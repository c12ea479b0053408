use axum::extract::ws::Message;
use tokio::sync::mpsc;

/// Capability to push one serialized envelope to one remote peer.
///
/// Delivery is fire-and-forget: `deliver` never blocks, never retries, and
/// reports nothing back. The directory holds handles behind
/// `Arc<dyn ConnectionHandle>` so a future non-WebSocket transport can seat
/// members without the directory knowing about transport details.
pub trait ConnectionHandle: Send + Sync {
    /// Queue one serialized envelope for delivery.
    fn deliver(&self, text: String);

    /// False once the remote side is gone.
    fn is_open(&self) -> bool;
}

/// WebSocket-backed handle over a session's outbound queue.
#[derive(Clone)]
pub struct WsConnection {
    tx: mpsc::Sender<Message>,
}

impl WsConnection {
    pub fn new(tx: mpsc::Sender<Message>) -> Self {
        Self { tx }
    }
}

impl ConnectionHandle for WsConnection {
    fn deliver(&self, text: String) {
        // lossy path: if the session's outbound queue is full, drop
        let _ = self.tx.try_send(Message::Text(text));
    }

    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}
