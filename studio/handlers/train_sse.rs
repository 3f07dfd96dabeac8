use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use serde_json::json;
use tiny_http::Request;

use neural_sandbox::TrainingOutcome;

use crate::state::{SharedState, TrainingStatus};
use crate::util::sse::{sse_event, write_sse, SSE_KEEPALIVE, SSE_RESPONSE_HEAD};

/// `GET /train/events` — Server-Sent Events handler.
///
/// Takes ownership of `request` so the raw writer can stream frames:
/// 1. waits up to 500 ms for the next `EpochStats` and writes it as an
///    `epoch` event;
/// 2. on timeout writes a keep-alive comment;
/// 3. once the training thread drops its sender, writes a final `done` or
///    `stopped` event and closes.
///
/// Epochs are delivered to one stream reader; the full history is always
/// available from `GET /session`.
pub fn handle(request: Request, state: SharedState) {
    let mut writer = request.into_writer();
    if !write_sse(&mut writer, SSE_RESPONSE_HEAD) {
        return;
    }

    // Clone the receiver out so the lock is not held while waiting.
    let epoch_rx = {
        let st = state.lock().unwrap();
        match &st.training {
            TrainingStatus::Running { epoch_rx, .. } => Some(epoch_rx.clone()),
            _ => None,
        }
    };

    if let Some(rx_arc) = epoch_rx {
        loop {
            let result = {
                let rx = rx_arc.lock().unwrap();
                rx.recv_timeout(Duration::from_millis(500))
            };
            match result {
                Ok(stats) => {
                    if !write_sse(&mut writer, &sse_event("epoch", &stats)) {
                        log::debug!("event stream client disconnected");
                        return;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !write_sse(&mut writer, SSE_KEEPALIVE) {
                        return;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    let last = {
        let st = state.lock().unwrap();
        match &st.training {
            TrainingStatus::Done { outcome: outcome @ TrainingOutcome::Completed(_) } => {
                sse_event("done", outcome)
            }
            TrainingStatus::Done { outcome: outcome @ TrainingOutcome::Stopped { .. } } => {
                sse_event("stopped", outcome)
            }
            other => sse_event("idle", &json!({ "status": other.label() })),
        }
    };
    let _ = write_sse(&mut writer, &last);
}
