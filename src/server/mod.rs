// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the main backend server components, including:
//! - Application state management
//! - HTTP/WebSocket routing
//! - Chat logic (session registry, matchmaking, relay, presence)

pub mod state;
pub mod router;
pub mod chat;
pub mod ws_error;
