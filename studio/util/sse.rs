use std::io::Write;
use serde::Serialize;

// ---------------------------------------------------------------------------
// SSE framing helpers
// ---------------------------------------------------------------------------

/// Raw HTTP response head for an event stream, written before any frame
/// because the body is streamed through `Request::into_writer`.
pub const SSE_RESPONSE_HEAD: &str = "HTTP/1.1 200 OK\r\n\
                                     Content-Type: text/event-stream\r\n\
                                     Cache-Control: no-cache\r\n\
                                     Connection: keep-alive\r\n\
                                     X-Accel-Buffering: no\r\n\
                                     \r\n";

/// Keep-alive comment; EventSource clients ignore lines starting with `:`.
pub const SSE_KEEPALIVE: &str = ": ping\n\n";

/// Formats a named SSE event with a JSON data payload.
///
/// ```text
/// event: <name>
/// data: <json>
///
/// ```
pub fn format_sse_event(event_name: &str, json_data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event_name, json_data)
}

/// Serializes `payload` and frames it as `event_name`. Falls back to `{}`
/// if serialization fails.
pub fn sse_event<T: Serialize>(event_name: &str, payload: &T) -> String {
    let json = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_owned());
    format_sse_event(event_name, &json)
}

/// Writes a single SSE message, flushing immediately.
/// Returns `false` if the write failed (client disconnected).
pub fn write_sse<W: Write>(writer: &mut W, msg: &str) -> bool {
    writer.write_all(msg.as_bytes()).is_ok() && writer.flush().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sse_event() {
        assert_eq!(format_sse_event("epoch", "{\"a\":1}"), "event: epoch\ndata: {\"a\":1}\n\n");
    }

    #[test]
    fn test_sse_event_serializes_payload() {
        let msg = sse_event("stopped", &serde_json::json!({ "epochsCompleted": 3 }));
        assert_eq!(msg, "event: stopped\ndata: {\"epochsCompleted\":3}\n\n");
    }

    #[test]
    fn test_write_sse_to_buffer() {
        let mut buf: Vec<u8> = Vec::new();
        assert!(write_sse(&mut buf, SSE_KEEPALIVE));
        assert_eq!(buf, b": ping\n\n");
    }
}
