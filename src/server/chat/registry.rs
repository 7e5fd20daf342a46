/// Connection registry: single source of truth for who is online and who is
/// paired with whom.
///
/// The registry owns every [`Session`] record. It keeps the primary
/// `user_id -> Session` map and the secondary `conn_id -> user_id` index in
/// lock-step, so a closed transport resolves to its session without scanning.
/// All mutation goes through the chat server actor, whose mailbox serializes
/// every operation that touches a session or a waiting queue.
use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use super::types::{ChatMode, UserId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("session {0} is already registered")]
    DuplicateSession(UserId),
    #[error("session {0} is not registered")]
    UnknownSession(UserId),
}

/// Server-side record of one connected client.
///
/// Generic over the transport handle so the pairing logic can be exercised
/// in tests without an actor system; in production `T` is the session
/// actor's address.
#[derive(Debug, Clone)]
pub struct Session<T> {
    pub user_id: UserId,
    pub mode: ChatMode,
    pub partner_id: Option<UserId>,
    pub conn_id: Uuid,
    pub transport: T,
}

pub struct Registry<T> {
    sessions: HashMap<UserId, Session<T>>,
    by_conn: HashMap<Uuid, UserId>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            by_conn: HashMap::new(),
        }
    }

    /// Create and store a new unpaired session.
    pub fn register(
        &mut self,
        user_id: UserId,
        mode: ChatMode,
        conn_id: Uuid,
        transport: T,
    ) -> Result<(), RegistryError> {
        if self.sessions.contains_key(&user_id) {
            return Err(RegistryError::DuplicateSession(user_id));
        }
        self.by_conn.insert(conn_id, user_id.clone());
        self.sessions.insert(
            user_id.clone(),
            Session {
                user_id,
                mode,
                partner_id: None,
                conn_id,
                transport,
            },
        );
        Ok(())
    }

    pub fn get(&self, user_id: &str) -> Option<&Session<T>> {
        self.sessions.get(user_id)
    }

    /// Atomically point two sessions at each other.
    pub fn set_partner(&mut self, id_a: &str, id_b: &str) -> Result<(), RegistryError> {
        if !self.sessions.contains_key(id_a) {
            return Err(RegistryError::UnknownSession(id_a.to_string()));
        }
        if !self.sessions.contains_key(id_b) {
            return Err(RegistryError::UnknownSession(id_b.to_string()));
        }
        if let Some(session) = self.sessions.get_mut(id_a) {
            session.partner_id = Some(id_b.to_string());
        }
        if let Some(session) = self.sessions.get_mut(id_b) {
            session.partner_id = Some(id_a.to_string());
        }
        Ok(())
    }

    /// Clear a session's partner reference; no-op if the session is gone.
    pub fn clear_partner(&mut self, user_id: &str) {
        if let Some(session) = self.sessions.get_mut(user_id) {
            session.partner_id = None;
        }
    }

    /// Remove and return a session, dropping its transport index entry.
    pub fn remove(&mut self, user_id: &str) -> Option<Session<T>> {
        let session = self.sessions.remove(user_id)?;
        self.by_conn.remove(&session.conn_id);
        Some(session)
    }

    /// Resolve the session owning a transport, via the secondary index.
    pub fn user_by_conn(&self, conn_id: Uuid) -> Option<&UserId> {
        self.by_conn.get(&conn_id)
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session<T>> {
        self.sessions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn register_then_get() {
        let mut registry: Registry<()> = Registry::new();
        registry
            .register("u1".to_string(), ChatMode::Text, conn(), ())
            .unwrap();

        let session = registry.get("u1").unwrap();
        assert_eq!(session.mode, ChatMode::Text);
        assert_eq!(session.partner_id, None);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry: Registry<()> = Registry::new();
        registry
            .register("u1".to_string(), ChatMode::Text, conn(), ())
            .unwrap();

        let err = registry
            .register("u1".to_string(), ChatMode::Video, conn(), ())
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateSession("u1".to_string()));
    }

    #[test]
    fn set_partner_is_symmetric() {
        let mut registry: Registry<()> = Registry::new();
        registry
            .register("u1".to_string(), ChatMode::Text, conn(), ())
            .unwrap();
        registry
            .register("u2".to_string(), ChatMode::Text, conn(), ())
            .unwrap();

        registry.set_partner("u1", "u2").unwrap();
        assert_eq!(registry.get("u1").unwrap().partner_id.as_deref(), Some("u2"));
        assert_eq!(registry.get("u2").unwrap().partner_id.as_deref(), Some("u1"));
    }

    #[test]
    fn set_partner_with_unknown_session_fails() {
        let mut registry: Registry<()> = Registry::new();
        registry
            .register("u1".to_string(), ChatMode::Text, conn(), ())
            .unwrap();

        let err = registry.set_partner("u1", "ghost").unwrap_err();
        assert_eq!(err, RegistryError::UnknownSession("ghost".to_string()));
        // The failed call must not leave a half-set pairing behind.
        assert_eq!(registry.get("u1").unwrap().partner_id, None);
    }

    #[test]
    fn remove_drops_the_transport_index_entry() {
        let mut registry: Registry<()> = Registry::new();
        let conn_id = conn();
        registry
            .register("u1".to_string(), ChatMode::Video, conn_id, ())
            .unwrap();
        assert_eq!(registry.user_by_conn(conn_id).map(String::as_str), Some("u1"));

        let removed = registry.remove("u1").unwrap();
        assert_eq!(removed.user_id, "u1");
        assert_eq!(registry.user_by_conn(conn_id), None);
        assert_eq!(registry.count(), 0);
        assert!(registry.remove("u1").is_none());
    }

    #[test]
    fn clear_partner_on_unknown_session_is_a_noop() {
        let mut registry: Registry<()> = Registry::new();
        registry.clear_partner("ghost");
        assert_eq!(registry.count(), 0);
    }
}
