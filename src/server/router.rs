//! HTTP and WebSocket routing configuration.
//!
//! Defines the single WebSocket endpoint clients connect to; everything else
//! (registration, matchmaking, relay) happens over that connection.

use actix_web::web;
use crate::server::chat::session::ws_chat;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").to(ws_chat));
}
