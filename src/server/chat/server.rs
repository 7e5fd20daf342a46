/// Chat server actor.
///
/// Owns the pairing engine (registry + waiting queues) and is the single
/// serialization point for every operation touching them: all session actors
/// talk to it through its mailbox, so registry and queue mutations never
/// interleave. Handlers only compute outbound frames and hand them to the
/// sessions with `do_send`, so nothing here blocks on a slow client.

use std::time::Duration;

use actix::prelude::*;
use log::debug;
use uuid::Uuid;

use super::engine::{ChatEngine, Delivery};
use super::session::ChatSession;
use super::types::{ChatMode, UserId};
use crate::config::server::USER_COUNT_INTERVAL_SECS;

type SessionAddr = Addr<ChatSession>;

pub struct ChatServer {
    engine: ChatEngine<SessionAddr>,
}

impl ChatServer {
    pub fn new() -> Self {
        Self {
            engine: ChatEngine::new(),
        }
    }

    /// Hand each computed frame to its session actor's mailbox.
    fn dispatch(&self, deliveries: Vec<Delivery<SessionAddr>>) {
        for delivery in deliveries {
            delivery.transport.do_send(delivery.frame);
        }
    }

    /// Send the current online count to every registered session.
    fn broadcast_user_count(&self) {
        self.dispatch(self.engine.user_count_broadcast());
    }
}

/// Message: a connected client registers a user session.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub conn_id: Uuid,
    pub user_id: UserId,
    pub mode: ChatMode,
    pub addr: SessionAddr,
}

/// Message: a registered client asks for a partner in its mode.
#[derive(Message)]
#[rtype(result = "()")]
pub struct FindPartner {
    pub user_id: UserId,
}

/// Message: relay a chat text to its addressee.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RelayChat {
    pub from: UserId,
    pub to: UserId,
    pub text: String,
}

/// Message: relay an opaque signaling frame verbatim to its addressee.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RelaySignaling {
    pub to: UserId,
    pub raw: String,
}

/// Message: a client explicitly leaves its pairing but stays connected.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub user_id: UserId,
}

/// Message: a client's WebSocket closed (voluntarily or on error).
#[derive(Message)]
#[rtype(result = "()")]
pub struct ConnectionClosed {
    pub conn_id: Uuid,
}

impl Actor for ChatServer {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        // Periodic presence broadcast, independent of inbound traffic.
        ctx.run_interval(Duration::from_secs(USER_COUNT_INTERVAL_SECS), |act, _ctx| {
            act.broadcast_user_count();
        });
    }
}

impl Handler<Connect> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        let out = self.engine.register(msg.user_id, msg.mode, msg.conn_id, msg.addr);
        self.dispatch(out);
        debug!("[Chat] {} users online", self.engine.count());
        // Publish the new count right away rather than waiting for the next tick.
        self.broadcast_user_count();
    }
}

impl Handler<FindPartner> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: FindPartner, _ctx: &mut Self::Context) -> Self::Result {
        let out = self.engine.find_partner(&msg.user_id);
        self.dispatch(out);
    }
}

impl Handler<RelayChat> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: RelayChat, _ctx: &mut Self::Context) -> Self::Result {
        match self.engine.relay_chat(&msg.from, &msg.to, msg.text) {
            Some(delivery) => self.dispatch(vec![delivery]),
            // Fire-and-forget: the sender gets no failure signal.
            None => debug!("[Chat] Dropping message for unknown user {}", msg.to),
        }
    }
}

impl Handler<RelaySignaling> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: RelaySignaling, _ctx: &mut Self::Context) -> Self::Result {
        match self.engine.relay_signaling(&msg.to, msg.raw) {
            Some(delivery) => self.dispatch(vec![delivery]),
            None => debug!("[Chat] Dropping signaling frame for unknown user {}", msg.to),
        }
    }
}

impl Handler<Disconnect> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _ctx: &mut Self::Context) -> Self::Result {
        let out = self.engine.disconnect(&msg.user_id);
        self.dispatch(out);
        self.broadcast_user_count();
    }
}

impl Handler<ConnectionClosed> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: ConnectionClosed, _ctx: &mut Self::Context) -> Self::Result {
        let out = self.engine.connection_closed(msg.conn_id);
        self.dispatch(out);
        self.broadcast_user_count();
    }
}
