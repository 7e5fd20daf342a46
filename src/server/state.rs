// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds a reference to the chat server actor address.
//! Used to share state between HTTP/WebSocket handlers and the actor system.

use actix::Addr;
use crate::server::chat::server::ChatServer;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the chat server actor (registry, matchmaking, relay, presence).
    pub chat_addr: Addr<ChatServer>,
}

impl AppState {
    /// Create a new AppState with the given actor address.
    pub fn new(chat_addr: Addr<ChatServer>) -> Self {
        AppState { chat_addr }
    }
}
