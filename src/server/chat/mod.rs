/// Chat module: handles the session registry, mode-scoped matchmaking,
/// message/signaling relay and presence broadcasting.

pub mod engine;
pub mod messages;
pub mod registry;
pub mod server;
pub mod session;
pub mod types;
