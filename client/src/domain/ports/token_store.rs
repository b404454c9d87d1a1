//! Driven port for the persisted bearer token.
//!
//! The store is the only shared mutable state in the client. The gateway
//! reads it before every dispatch and writes it when the server rotates or
//! invalidates the credential; the session gate mirrors it for navigation.

use tokio::sync::watch;

use super::define_port_error;
use crate::domain::{Role, Token};

define_port_error! {
    /// Errors raised while persisting the token.
    pub enum TokenStoreError {
        /// The durable medium could not be opened.
        Open { message: String } => "token store could not be opened: {message}",
        /// The durable medium could not be read.
        Read { message: String } => "token store read failed: {message}",
        /// The durable medium rejected the write.
        Write { message: String } => "token store write failed: {message}",
    }
}

/// Storage for the current bearer token.
///
/// Setting the empty token is equivalent to [`TokenStore::clear`]. Every
/// successful mutation is broadcast to [`TokenStore::subscribe`] receivers.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    /// Current token; the empty token when nothing is stored.
    fn get(&self) -> Token;

    /// Replace the stored token. The empty token removes it.
    fn set(&self, token: Token) -> Result<(), TokenStoreError>;

    /// Remove the stored token.
    fn clear(&self) -> Result<(), TokenStoreError> {
        self.set(Token::empty())
    }

    /// Receiver observing every change made through this store.
    fn subscribe(&self) -> watch::Receiver<Token>;
}

/// Role carried by `token`.
///
/// Total: malformed tokens yield [`Role::Unknown`].
#[must_use]
pub fn role_of(token: &Token) -> Role {
    token.role()
}

/// In-process token store backed by a watch channel.
///
/// # Examples
/// ```
/// use flashcourt::Token;
/// use flashcourt::domain::ports::{MemoryTokenStore, TokenStore};
///
/// let store = MemoryTokenStore::default();
/// store.set(Token::new("abc")).expect("memory store never fails");
/// assert_eq!(store.get().as_str(), "abc");
/// store.clear().expect("memory store never fails");
/// assert!(store.get().is_empty());
/// ```
#[derive(Debug)]
pub struct MemoryTokenStore {
    current: watch::Sender<Token>,
}

impl MemoryTokenStore {
    /// Store seeded with `token`.
    #[must_use]
    pub fn with_token(token: Token) -> Self {
        let (current, _) = watch::channel(token);
        Self { current }
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::with_token(Token::empty())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Token {
        self.current.borrow().clone()
    }

    fn set(&self, token: Token) -> Result<(), TokenStoreError> {
        self.current.send_replace(token);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Token> {
        self.current.subscribe()
    }
}
