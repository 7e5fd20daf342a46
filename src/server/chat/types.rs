use serde::{Deserialize, Serialize};

/// Opaque client-supplied identifier for a chat user.
///
/// The client is responsible for generating it with enough entropy;
/// the server never inspects or validates its contents.
pub type UserId = String;

/// Chat category requested by a client. Matching never crosses modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    Text,
    Video,
}
