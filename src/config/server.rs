/// Server configuration constants.
///
/// This module defines parameters for the chat server, such as the listen
/// port and the presence broadcast interval.

/// Port used when the `PORT` environment variable is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// Interval (in seconds) between periodic `user_count` broadcasts.
pub const USER_COUNT_INTERVAL_SECS: u64 = 5;

/// Resolve the listen port, overridable via the `PORT` environment variable.
///
/// An unset or unparsable value falls back to [`DEFAULT_PORT`].
pub fn listen_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
