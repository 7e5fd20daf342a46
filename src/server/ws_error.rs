/// Centralized helper for WebSocket error frames.
///
/// Use this helper so every error sent to a client carries the same shape as
/// the rest of the wire protocol: a `type` discriminant plus a message.
use serde_json::json;

/// Formats a WebSocket error frame as a JSON string.
///
/// # Arguments
/// - `message`: Human-readable error message (in English).
pub fn ws_error_message(message: &str) -> String {
    json!({ "type": "error", "message": message }).to_string()
}
