/// neural-sandbox Studio
///
/// A small JSON + Server-Sent Events host for the training engine. It plays
/// the part of the game front-end: it keeps the player's session, builds
/// networks, runs training on a background thread and streams each epoch.
///
/// Run with:
///   cargo run --bin studio --release
/// Then, for example:
///   curl -X POST 'http://127.0.0.1:7878/network/random?hidden=5'
///   curl -X POST 'http://127.0.0.1:7878/train/start?epochs=20'
///   curl -N http://127.0.0.1:7878/train/events
///
/// The bind address can be changed with `STUDIO_ADDR`.

mod state;
mod routes;
mod handlers;
mod util;

use std::sync::{Arc, Mutex};
use tiny_http::Server;

use state::StudioState;

const DEFAULT_ADDR: &str = "127.0.0.1:7878";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let addr = std::env::var("STUDIO_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned());
    let server = Server::http(&addr)
        .map_err(|e| anyhow::anyhow!("failed to bind HTTP server on {addr}: {e}"))?;

    let shared_state = Arc::new(Mutex::new(StudioState::new()));

    log::info!("studio listening on http://{addr}");

    // Each request is dispatched on its own thread so the SSE handler
    // (which blocks for the entire training duration) does not stall
    // regular requests.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }

    Ok(())
}
