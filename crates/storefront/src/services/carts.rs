//! Server-side cart persistence, keyed by browser session.
//!
//! Carts survive restarts of the browser tab, not of the server: the vault
//! is an in-process map from session id to stored payloads. A lost vault
//! degrades to every session rehydrating an empty cart, which the cart's
//! hydration rules already handle.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use maison_core::cart::{CART_STORAGE_KEY, CartStorage, CartStorageError};

type Payloads = HashMap<String, String>;

/// Shared store of per-session cart payloads.
#[derive(Clone, Default)]
pub struct CartVault {
    sessions: Arc<RwLock<HashMap<String, Payloads>>>,
}

impl CartVault {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage handle bound to one session.
    #[must_use]
    pub fn storage_for(&self, session_id: &str) -> SessionCartStorage {
        SessionCartStorage {
            vault: self.clone(),
            session_id: session_id.to_owned(),
        }
    }
}

/// [`CartStorage`] backed by the vault for a single session.
pub struct SessionCartStorage {
    vault: CartVault,
    session_id: String,
}

impl CartStorage for SessionCartStorage {
    fn load(&self) -> Result<Option<String>, CartStorageError> {
        let sessions = self
            .vault
            .sessions
            .read()
            .map_err(|_| CartStorageError("cart vault lock poisoned".to_owned()))?;
        Ok(sessions
            .get(&self.session_id)
            .and_then(|payloads| payloads.get(CART_STORAGE_KEY))
            .cloned())
    }

    fn save(&self, payload: &str) -> Result<(), CartStorageError> {
        let mut sessions = self
            .vault
            .sessions
            .write()
            .map_err(|_| CartStorageError("cart vault lock poisoned".to_owned()))?;
        sessions
            .entry(self.session_id.clone())
            .or_default()
            .insert(CART_STORAGE_KEY.to_owned(), payload.to_owned());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_roundtrips_within_a_session() {
        let vault = CartVault::new();
        vault.storage_for("session-a").save("[1,2,3]").unwrap();

        let reloaded = vault.storage_for("session-a").load().unwrap();
        assert_eq!(reloaded.as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let vault = CartVault::new();
        vault.storage_for("session-a").save("[1]").unwrap();

        assert_eq!(vault.storage_for("session-b").load().unwrap(), None);
    }
}
