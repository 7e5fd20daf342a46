/// WebSocket session handler for one chat client.
///
/// This actor owns a single client connection: it decodes inbound frames,
/// relays the corresponding operations to the chat server actor, and writes
/// outbound frames back to the socket. It never touches registry or queue
/// state directly.
use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::debug;
use uuid::Uuid;

use super::messages::{ClientWsMessage, SessionFrame};
use super::server::{
    ChatServer, Connect, ConnectionClosed, Disconnect, FindPartner, RelayChat, RelaySignaling,
};
use super::types::UserId;
use crate::server::ws_error::ws_error_message;

/// Represents one client's WebSocket connection.
pub struct ChatSession {
    /// Server-assigned connection id, the key of the transport index.
    pub conn_id: Uuid,
    /// User id announced by the client's `register` frame, for logging.
    pub user_id: Option<UserId>,
    pub chat_addr: Addr<ChatServer>,
}

impl Actor for ChatSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        debug!("[Chat] New WebSocket connection {}", self.conn_id);
    }

    /// Called when the socket closes or errors. The chat server unwinds
    /// whatever state this connection left behind.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        debug!(
            "[Chat] Connection {} closed (user {:?})",
            self.conn_id, self.user_id
        );
        self.chat_addr.do_send(ConnectionClosed {
            conn_id: self.conn_id,
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChatSession {
    /// Handles incoming WebSocket frames from the client.
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => {
                match serde_json::from_str::<ClientWsMessage>(&text) {
                    Ok(ClientWsMessage::Register { user_id, mode }) => {
                        self.user_id = Some(user_id.clone());
                        self.chat_addr.do_send(Connect {
                            conn_id: self.conn_id,
                            user_id,
                            mode,
                            addr: ctx.address(),
                        });
                    }
                    Ok(ClientWsMessage::FindPartner { user_id, .. }) => {
                        self.chat_addr.do_send(FindPartner { user_id });
                    }
                    Ok(ClientWsMessage::Message { from, to, text }) => {
                        self.chat_addr.do_send(RelayChat { from, to, text });
                    }
                    Ok(ClientWsMessage::Disconnect { user_id, .. }) => {
                        self.chat_addr.do_send(Disconnect { user_id });
                    }
                    Ok(ClientWsMessage::Offer { to, .. })
                    | Ok(ClientWsMessage::Answer { to, .. })
                    | Ok(ClientWsMessage::IceCandidate { to, .. }) => {
                        // The decoded payload is discarded: the original frame
                        // is what gets forwarded, verbatim.
                        self.chat_addr.do_send(RelaySignaling {
                            to,
                            raw: text.to_string(),
                        });
                    }
                    Err(err) => {
                        // Malformed or unsupported frame: tell the sender, keep
                        // the connection (and everyone else's) alive.
                        debug!(
                            "[Chat] Invalid frame on connection {}: {err}",
                            self.conn_id
                        );
                        ctx.text(ws_error_message("Invalid client message"));
                    }
                }
            }
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(_)) => ctx.stop(),
            _ => (),
        }
    }
}

impl Handler<SessionFrame> for ChatSession {
    type Result = ();

    /// Writes an outbound frame computed by the chat server to the socket.
    fn handle(&mut self, msg: SessionFrame, ctx: &mut Self::Context) {
        match msg {
            SessionFrame::Typed(msg) => match serde_json::to_string(&msg) {
                Ok(text) => ctx.text(text),
                Err(err) => {
                    // Serialization error: notify client and close connection.
                    debug!("[Chat] Failed to serialize ServerWsMessage: {err}");
                    ctx.text(ws_error_message("Internal server error"));
                    ctx.close(Some(ws::CloseReason {
                        code: ws::CloseCode::Error,
                        description: Some("Internal server error".into()),
                    }));
                    ctx.stop();
                }
            },
            SessionFrame::Verbatim(raw) => ctx.text(raw),
            SessionFrame::Kicked { reason } => {
                ctx.text(ws_error_message(&reason));
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Policy,
                    description: Some("Session replaced".into()),
                }));
                ctx.stop();
            }
        }
    }
}

/// WebSocket endpoint for the chat server.
///
/// The client announces its user id and mode through a `register` frame once
/// connected; the handshake itself carries nothing.
pub async fn ws_chat(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    ws::start(
        ChatSession {
            conn_id: Uuid::new_v4(),
            user_id: None,
            chat_addr: data.chat_addr.clone(),
        },
        &req,
        stream,
    )
}
