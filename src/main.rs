//! Main entry point for the backend server.
//!
//! Initializes the actor system, configures application state, and launches
//! the HTTP server with the WebSocket endpoint for chat clients.

use actix::Actor;
use actix_web::{web, App, HttpServer};
use log::info;
use server::chat::server::ChatServer;

pub mod config;
mod server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::init();

    // Start the ChatServer actor (registry, matchmaking, relay, presence).
    let chat_addr = ChatServer::new().start();

    // Shared application state for HTTP/WebSocket handlers.
    let state = web::Data::new(server::state::AppState::new(chat_addr));

    let port = config::server::listen_port();
    info!("[Chat] Server listening on port {port}");

    // Start the HTTP server with the WebSocket endpoint.
    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*")),
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
