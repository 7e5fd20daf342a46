/// Pairing engine: matchmaking queues, relay routing and the disconnection
/// cascade, expressed over the connection registry.
///
/// Every operation returns the outbound frames it produced as [`Delivery`]
/// values instead of writing to sockets itself; the chat server actor
/// dispatches them. This keeps the engine free of actor types and lets the
/// pairing semantics be tested with a plain transport token.
use std::collections::{HashMap, VecDeque};

use log::{debug, info};
use uuid::Uuid;

use super::messages::{ServerWsMessage, SessionFrame};
use super::registry::Registry;
use super::types::{ChatMode, UserId};

/// One outbound frame bound for one transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery<T> {
    pub transport: T,
    pub frame: SessionFrame,
}

impl<T> Delivery<T> {
    fn typed(transport: T, msg: ServerWsMessage) -> Self {
        Self {
            transport,
            frame: SessionFrame::Typed(msg),
        }
    }
}

pub struct ChatEngine<T> {
    registry: Registry<T>,
    /// One FIFO waiting queue of unmatched user ids per mode, created lazily.
    waiting: HashMap<ChatMode, VecDeque<UserId>>,
}

impl<T: Clone> ChatEngine<T> {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            waiting: HashMap::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.registry.count()
    }

    /// Register a user session.
    ///
    /// A repeated registration with a live user id replaces the previous
    /// session: the old one is unwound exactly like a closed transport
    /// (partner notified, waiting-queue entry dropped, registry entry
    /// removed) and its socket is kicked.
    pub fn register(
        &mut self,
        user_id: UserId,
        mode: ChatMode,
        conn_id: Uuid,
        transport: T,
    ) -> Vec<Delivery<T>> {
        let mut out = Vec::new();

        if self.registry.get(&user_id).is_some() {
            debug!("[Chat] User {user_id} re-registered, replacing previous session");
            out.extend(self.unpair(&user_id));
            if let Some(old) = self.registry.remove(&user_id) {
                self.dequeue(old.mode, &user_id);
                out.push(Delivery {
                    transport: old.transport,
                    frame: SessionFrame::Kicked {
                        reason: "Another connection has registered with your id.".to_string(),
                    },
                });
            }
        }

        match self.registry.register(user_id.clone(), mode, conn_id, transport.clone()) {
            Ok(()) => {
                info!("[Chat] User {user_id} registered ({mode:?})");
                out.push(Delivery::typed(transport, ServerWsMessage::registered(user_id)));
            }
            Err(err) => {
                // Unreachable after the replacement above; never corrupt state over it.
                debug!("[Chat] Registration of {user_id} rejected: {err}");
            }
        }
        out
    }

    /// Pair the requesting user with the oldest valid waiter of its mode,
    /// or append it to the waiting queue.
    ///
    /// Stale queue entries (waiters that disconnected or got paired after
    /// being enqueued) are discarded on the way.
    pub fn find_partner(&mut self, user_id: &str) -> Vec<Delivery<T>> {
        let (mode, seeker_transport) = match self.registry.get(user_id) {
            Some(session) if session.partner_id.is_none() => {
                (session.mode, session.transport.clone())
            }
            Some(_) => {
                debug!("[Chat] User {user_id} requested a partner while already paired");
                return Vec::new();
            }
            None => {
                // Client vanished mid-request.
                return Vec::new();
            }
        };

        let queue = self.waiting.entry(mode).or_default();
        // Idempotent re-request: drop any previous entry of the seeker.
        if let Some(pos) = queue.iter().position(|id| id == user_id) {
            queue.remove(pos);
        }

        while let Some(candidate_id) = queue.pop_front() {
            let candidate_transport = match self.registry.get(&candidate_id) {
                Some(candidate) if candidate.partner_id.is_none() => {
                    candidate.transport.clone()
                }
                _ => {
                    debug!("[Chat] Dropping stale waiting entry {candidate_id}");
                    continue;
                }
            };

            if self.registry.set_partner(user_id, &candidate_id).is_err() {
                continue;
            }
            info!("[Chat] Paired {user_id} <-> {candidate_id} ({mode:?})");
            return vec![
                Delivery::typed(
                    seeker_transport,
                    ServerWsMessage::partner_found(candidate_id),
                ),
                Delivery::typed(
                    candidate_transport,
                    ServerWsMessage::partner_found(user_id.to_string()),
                ),
            ];
        }

        queue.push_back(user_id.to_string());
        debug!("[Chat] User {user_id} waiting for a partner ({mode:?})");
        Vec::new()
    }

    /// Forward a chat message to its addressee; silently dropped if the
    /// addressee is unknown (fire-and-forget).
    pub fn relay_chat(&self, from: &str, to: &str, text: String) -> Option<Delivery<T>> {
        let recipient = self.registry.get(to)?;
        Some(Delivery::typed(
            recipient.transport.clone(),
            ServerWsMessage::Message {
                from: from.to_string(),
                text,
            },
        ))
    }

    /// Forward an opaque signaling frame verbatim to its addressee;
    /// silently dropped if the addressee is unknown.
    pub fn relay_signaling(&self, to: &str, raw: String) -> Option<Delivery<T>> {
        let recipient = self.registry.get(to)?;
        Some(Delivery {
            transport: recipient.transport.clone(),
            frame: SessionFrame::Verbatim(raw),
        })
    }

    /// Explicit unpair requested by a still-connected client.
    ///
    /// The requesting session stays registered and may search again.
    pub fn disconnect(&mut self, user_id: &str) -> Vec<Delivery<T>> {
        let out = self.unpair(user_id);
        if !out.is_empty() {
            info!("[Chat] User {user_id} left its pairing");
        }
        out
    }

    /// Cascade for a closed transport: unpair with notification, drop any
    /// waiting-queue entry, remove the session.
    pub fn connection_closed(&mut self, conn_id: Uuid) -> Vec<Delivery<T>> {
        let Some(user_id) = self.registry.user_by_conn(conn_id).cloned() else {
            // Already cleaned up, or the transport never registered.
            return Vec::new();
        };
        let out = self.unpair(&user_id);
        if let Some(session) = self.registry.remove(&user_id) {
            self.dequeue(session.mode, &user_id);
        }
        info!("[Chat] User {user_id} disconnected");
        out
    }

    /// Presence broadcast: one `user_count` frame per registered session.
    pub fn user_count_broadcast(&self) -> Vec<Delivery<T>> {
        let count = self.registry.count();
        self.registry
            .sessions()
            .map(|session| {
                Delivery::typed(
                    session.transport.clone(),
                    ServerWsMessage::UserCount { count },
                )
            })
            .collect()
    }

    /// Clear both sides of a pairing and notify the former partner.
    fn unpair(&mut self, user_id: &str) -> Vec<Delivery<T>> {
        let Some(partner_id) = self
            .registry
            .get(user_id)
            .and_then(|session| session.partner_id.clone())
        else {
            return Vec::new();
        };
        self.registry.clear_partner(user_id);
        self.registry.clear_partner(&partner_id);
        match self.registry.get(&partner_id) {
            Some(partner) => vec![Delivery::typed(
                partner.transport.clone(),
                ServerWsMessage::PartnerDisconnected,
            )],
            None => Vec::new(),
        }
    }

    /// Drop a user id from its mode's waiting queue, if present.
    fn dequeue(&mut self, mode: ChatMode, user_id: &str) {
        if let Some(queue) = self.waiting.get_mut(&mode) {
            if let Some(pos) = queue.iter().position(|id| id == user_id) {
                queue.remove(pos);
            }
        }
    }
}
