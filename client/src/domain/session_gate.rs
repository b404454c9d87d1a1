//! Authentication state mirror and navigation guard.
//!
//! [`SessionGate`] keeps an in-memory copy of the token and its role so
//! callers can ask "is anyone signed in?" without touching storage. The
//! navigation rule re-reads the store on every evaluation because the
//! gateway may have rotated or invalidated the token in the meantime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use super::ports::{TokenStore, TokenStoreError};
use super::{Role, Token};

/// Login surface that unauthenticated callers are confined to.
pub const LOGIN_PATH: &str = "/auth";
/// Landing path for authenticated callers leaving the login surface.
pub const HOME_PATH: &str = "/";

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    /// Current token; empty when signed out.
    pub token: Token,
    /// Role for the current token.
    pub role: Role,
}

impl SessionSnapshot {
    fn from_token(token: Token) -> Self {
        let role = token.role();
        Self { token, role }
    }

    /// Whether a token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// Whether the role is [`Role::Admin`].
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Outcome of a navigation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Proceed to the requested path.
    Allow,
    /// Go to this path instead.
    Redirect(&'static str),
}

/// Session state derived from the token store.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use flashcourt::domain::ports::MemoryTokenStore;
/// use flashcourt::domain::{NavigationDecision, SessionGate};
/// use flashcourt::Token;
///
/// let gate = SessionGate::new(Arc::new(MemoryTokenStore::default()));
/// assert_eq!(gate.evaluate("/"), NavigationDecision::Redirect("/auth"));
///
/// gate.save_token(Token::new("abc")).expect("memory store");
/// assert_eq!(gate.evaluate("/auth"), NavigationDecision::Redirect("/"));
/// assert_eq!(gate.evaluate("/reservations"), NavigationDecision::Allow);
/// ```
pub struct SessionGate {
    store: Arc<dyn TokenStore>,
    state: Mutex<SessionSnapshot>,
}

impl SessionGate {
    /// Build a gate seeded from the store's current token.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let state = Mutex::new(SessionSnapshot::from_token(store.get()));
        Self { store, state }
    }

    fn state(&self) -> MutexGuard<'_, SessionSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist `token` and refresh the mirror.
    ///
    /// The mirror is updated even when persistence fails.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the token could not be persisted.
    pub fn save_token(&self, token: Token) -> Result<(), TokenStoreError> {
        let persisted = self.store.set(token.clone());
        *self.state() = SessionSnapshot::from_token(token);
        persisted
    }

    /// Reload the mirror from the store.
    pub fn restore_token(&self) -> SessionSnapshot {
        let snapshot = SessionSnapshot::from_token(self.store.get());
        *self.state() = snapshot.clone();
        snapshot
    }

    /// Clear the stored token and the mirror.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the token could not be removed.
    pub fn logout(&self) -> Result<(), TokenStoreError> {
        let cleared = self.store.clear();
        *self.state() = SessionSnapshot::default();
        debug!("session cleared");
        cleared
    }

    /// Override the mirrored role, e.g. after fetching the account profile.
    ///
    /// The role is recomputed from the token on the next restore.
    pub fn sync_role(&self, role: Role) {
        self.state().role = role;
    }

    /// Current mirrored state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state().clone()
    }

    /// Receiver observing token changes in the underlying store.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Token> {
        self.store.subscribe()
    }

    /// Whether the mirror holds a token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// Whether the mirrored role is admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state().is_admin()
    }

    /// Decide whether navigation to `path` may proceed.
    ///
    /// Re-reads the store first. Unauthenticated callers are confined to
    /// [`LOGIN_PATH`]; authenticated callers are sent from it to
    /// [`HOME_PATH`].
    pub fn evaluate(&self, path: &str) -> NavigationDecision {
        let authenticated = self.restore_token().is_authenticated();
        match (path == LOGIN_PATH, authenticated) {
            (true, true) => NavigationDecision::Redirect(HOME_PATH),
            (false, false) => NavigationDecision::Redirect(LOGIN_PATH),
            _ => NavigationDecision::Allow,
        }
    }
}
