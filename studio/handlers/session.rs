use std::io::Cursor;
use serde::Serialize;
use tiny_http::Response;

use neural_sandbox::session::{catalog, GameSession};

use crate::routes::{json_error, json_ok};
use crate::state::SharedState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView<'a> {
    #[serde(flatten)]
    session:          &'a GameSession,
    training_status:  &'static str,
    has_passed_level: bool,
    violations:       Vec<String>,
}

// ---------------------------------------------------------------------------
// GET /levels
// ---------------------------------------------------------------------------

pub fn handle_levels() -> Response<Cursor<Vec<u8>>> {
    json_ok(&catalog())
}

// ---------------------------------------------------------------------------
// GET /session
// ---------------------------------------------------------------------------

pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    let violations = st
        .session
        .network
        .as_ref()
        .map(|n| st.session.level.violations(n))
        .unwrap_or_default();
    json_ok(&SessionView {
        session:          &st.session,
        training_status:  st.training.label(),
        has_passed_level: st.session.has_passed_level(),
        violations,
    })
}

// ---------------------------------------------------------------------------
// POST /level/next
// ---------------------------------------------------------------------------

pub fn handle_next_level(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = state.lock().unwrap();
    if st.is_running() {
        return json_error(409, "training is in progress");
    }
    if !st.session.has_passed_level() {
        return json_error(409, "current level has not been passed yet");
    }
    if !st.session.advance_to_next_level() {
        return json_error(409, "already on the last level");
    }
    log::info!("advanced to level {}", st.session.level.id());
    json_ok(&st.session.level)
}

// ---------------------------------------------------------------------------
// GET /submission
// ---------------------------------------------------------------------------

pub fn handle_submission(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    match st.session.submission() {
        Some(submission) => json_ok(&submission),
        None             => json_error(409, "no network has been built yet"),
    }
}
