use std::io::Cursor;
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::state::SharedState;
use crate::handlers;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub fn json_response(status: u16, body: String) -> Response<Cursor<Vec<u8>>> {
    let bytes = body.into_bytes();
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        vec![Header::from_bytes(b"Content-Type", b"application/json").unwrap()],
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

/// 200 with `value` serialized as JSON.
pub fn json_ok<T: Serialize>(value: &T) -> Response<Cursor<Vec<u8>>> {
    match serde_json::to_string(value) {
        Ok(body) => json_response(200, body),
        Err(e)   => json_error(500, &format!("serialization failed: {e}")),
    }
}

/// `{"error": "..."}` with the given status.
pub fn json_error(status: u16, message: &str) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": message }).to_string();
    json_response(status, body)
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    json_error(404, "not found")
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// All handlers (except SSE) receive a `&mut Request` or the parsed query so
/// that the dispatcher retains ownership and can call `request.respond()` at
/// the end. The SSE handler takes ownership to perform long-lived streaming.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();

    let (path, query) = if let Some(pos) = url.find('?') {
        (url[..pos].to_owned(), url[pos + 1..].to_owned())
    } else {
        (url.clone(), String::new())
    };

    log::debug!("{} {}", method, path);

    // SSE — long-lived; handler takes ownership and drives the stream loop.
    if method == Method::Get && path == "/train/events" {
        handlers::train_sse::handle(request, state);
        return;
    }

    let response = match (method, path.as_str()) {
        // ── Levels & session ─────────────────────────────────────────────
        (Method::Get,  "/levels")      => handlers::session::handle_levels(),
        (Method::Post, "/level/next")  => handlers::session::handle_next_level(state),
        (Method::Get,  "/session")     => handlers::session::handle_get(state),
        (Method::Get,  "/submission")  => handlers::session::handle_submission(state),

        // ── Network ──────────────────────────────────────────────────────
        (Method::Post, "/network/random")      => handlers::network::handle_random(&query, state),
        (Method::Post, "/network")             => handlers::network::handle_put(&mut request, state),
        (Method::Get,  "/network")             => handlers::network::handle_get(state),
        (Method::Get,  "/network/fingerprint") => handlers::network::handle_fingerprint(state),
        (Method::Get,  "/dataset/preview")     => handlers::network::handle_preview(&query, state),

        // ── Train ────────────────────────────────────────────────────────
        (Method::Post, "/train/start") => handlers::train::handle_start(&query, state),
        (Method::Post, "/train/stop")  => handlers::train::handle_stop(state),

        // ── 404 ──────────────────────────────────────────────────────────
        _ => not_found(),
    };

    let _ = request.respond(response);
}
