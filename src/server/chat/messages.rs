use actix::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{ChatMode, UserId};

/// Messages accepted from clients.
///
/// The wire format is a closed tagged union: a `type` discriminant plus
/// camelCase fields per variant. Frames with an unknown `type` or missing
/// fields are rejected at decode time.
///
/// The WebRTC signaling variants (`offer`, `answer`, `ice_candidate`) are
/// decoded only far enough to validate the discriminant and extract the
/// destination id; their payload stays opaque and the original frame is
/// forwarded verbatim.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientWsMessage {
    Register {
        user_id: UserId,
        mode: ChatMode,
    },
    FindPartner {
        user_id: UserId,
        // Clients echo their mode here; the server trusts the mode fixed
        // at registration instead.
        #[serde(default)]
        mode: Option<ChatMode>,
    },
    Message {
        from: UserId,
        to: UserId,
        text: String,
    },
    Disconnect {
        user_id: UserId,
        // Accepted for wire compatibility; the partner is resolved from the
        // registry, never from this field.
        #[serde(default)]
        partner_id: Option<UserId>,
    },
    Offer {
        to: UserId,
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
    Answer {
        to: UserId,
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
    IceCandidate {
        to: UserId,
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
}

// Message serveur -> client
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerWsMessage {
    Registered { user_id: UserId },
    PartnerFound { partner_id: UserId },
    Message { from: UserId, text: String },
    PartnerDisconnected,
    UserCount { count: usize },
    Error { message: String },
}

impl ServerWsMessage {
    pub fn registered(user_id: UserId) -> Self {
        Self::Registered { user_id }
    }
    pub fn partner_found(partner_id: UserId) -> Self {
        Self::PartnerFound { partner_id }
    }
    pub fn error(message: &str) -> Self {
        Self::Error { message: message.to_string() }
    }
}

/// One outbound frame addressed to a single client session.
#[derive(Message, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
pub enum SessionFrame {
    /// A typed server message, serialized to JSON before sending.
    Typed(ServerWsMessage),
    /// A frame relayed verbatim (opaque WebRTC signaling).
    Verbatim(String),
    /// The session was replaced by a newer connection with the same user id;
    /// the receiving actor closes the socket.
    Kicked { reason: String },
}
