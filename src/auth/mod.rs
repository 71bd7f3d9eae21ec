//! Admin token access for authenticated requests.
//!
//! The slot engine never renders a login flow itself; it consumes a token
//! store. A 401/403 from the service clears the stored token so the next
//! action fails fast with [`AuthError::TokenRequired`] instead of retrying
//! with credentials the server already rejected.

use std::sync::Mutex;
use thiserror::Error;

pub const TOKEN_ENV_VAR: &str = "SLOTBOX_ADMIN_TOKEN";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("admin token required (set {TOKEN_ENV_VAR})")]
    TokenRequired,
}

/// Bearer-token source consumed by the HTTP client.
pub trait TokenStore: Send + Sync {
    /// Current token, if any.
    fn token(&self) -> Option<String>;

    /// Forget the token for the rest of the session.
    fn clear(&self);

    /// Token or an error the caller surfaces before issuing any request.
    fn require_token(&self) -> Result<String, AuthError> {
        self.token().ok_or(AuthError::TokenRequired)
    }
}

/// In-memory token cell, seeded from the environment at startup.
#[derive(Debug)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn from_env() -> Self {
        let token = std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|t| !t.trim().is_empty());
        Self {
            token: Mutex::new(token),
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    pub fn empty() -> Self {
        Self {
            token: Mutex::new(None),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.lock().expect("token lock poisoned").clone()
    }

    fn clear(&self) {
        tracing::warn!("Clearing stored admin token");
        *self.token.lock().expect("token lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_token_fails_when_empty() {
        let store = MemoryTokenStore::empty();
        assert!(store.token().is_none());
        assert!(matches!(
            store.require_token(),
            Err(AuthError::TokenRequired)
        ));
    }

    #[test]
    fn clear_drops_seeded_token() {
        let store = MemoryTokenStore::with_token("secret");
        assert_eq!(store.require_token().unwrap(), "secret");
        store.clear();
        assert!(store.token().is_none());
    }
}
