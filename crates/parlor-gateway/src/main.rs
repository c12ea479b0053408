//! parlor gateway binary.
//!
//! - WebSocket endpoints: /v1/chat (named tables), /v1/match (FIFO pairing)
//! - Decode-once pipeline: WS Message -> Envelope
//! - Heartbeat ping + idle timeout

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use parlor_gateway::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = config::load_from_file("parlor.yaml").expect("config load failed");
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .expect("gateway.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(cfg);
    let app = router::build_router(state);

    tracing::info!(%listen, "parlor-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app).await.expect("server failed");
}
