//! File-backed token store.
//!
//! The token lives in a single file named after the storage key inside a
//! client data directory. Writes go through a temporary file and a rename
//! so a crash never leaves a truncated token behind. Reads always hit the
//! file, so a token removed by another process is seen on the next `get`.

use std::io;
use std::sync::{Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::Token;
use crate::domain::ports::{TokenStore, TokenStoreError};

/// Token store persisting to `<dir>/<key>`.
pub struct FileTokenStore {
    dir: Dir,
    key: String,
    location: Utf8PathBuf,
    current: watch::Sender<Token>,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    /// Storage key used by the web client.
    pub const DEFAULT_KEY: &'static str = "bf_token";

    /// Open (creating if needed) `dir` and load any stored token.
    ///
    /// # Errors
    ///
    /// [`TokenStoreError::Open`] when `key` is not a plain file name or the
    /// directory cannot be created or opened.
    pub fn open(dir: &Utf8Path, key: &str) -> Result<Self, TokenStoreError> {
        validate_key(key)?;
        Dir::create_ambient_dir_all(dir, ambient_authority())
            .map_err(|error| TokenStoreError::open(format!("{dir}: {error}")))?;
        let handle = Dir::open_ambient_dir(dir, ambient_authority())
            .map_err(|error| TokenStoreError::open(format!("{dir}: {error}")))?;
        let location = dir.join(key);
        let initial = match read_token(&handle, key) {
            Ok(token) => token,
            Err(error) => {
                warn!(path = %location, %error, "stored token unreadable; starting logged out");
                Token::empty()
            }
        };
        let (current, _) = watch::channel(initial);
        Ok(Self {
            dir: handle,
            key: key.to_owned(),
            location,
            current,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the token file.
    #[must_use]
    pub fn location(&self) -> &Utf8Path {
        &self.location
    }

    fn temp_name(&self) -> String {
        format!(".{}.{}.tmp", self.key, std::process::id())
    }

    fn persist(&self, token: &Token) -> Result<(), TokenStoreError> {
        if token.is_empty() {
            return match self.dir.remove_file(&self.key) {
                Ok(()) => Ok(()),
                Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(error) => Err(self.write_error(&error)),
            };
        }
        let temp = self.temp_name();
        self.dir
            .write(&temp, token.as_str().as_bytes())
            .map_err(|error| self.write_error(&error))?;
        if let Err(error) = self.dir.rename(&temp, &self.dir, &self.key) {
            let _cleanup_result = self.dir.remove_file(&temp);
            return Err(self.write_error(&error));
        }
        Ok(())
    }

    fn write_error(&self, error: &io::Error) -> TokenStoreError {
        TokenStoreError::write(format!("{}: {error}", self.location))
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Token {
        let token = match read_token(&self.dir, &self.key) {
            Ok(token) => token,
            Err(error) => {
                warn!(path = %self.location, %error, "stored token unreadable; treating as logged out");
                Token::empty()
            }
        };
        let changed = self.current.send_if_modified(|held| {
            if *held == token {
                false
            } else {
                *held = token.clone();
                true
            }
        });
        if changed {
            debug!(path = %self.location, "token changed outside this store");
        }
        token
    }

    fn set(&self, token: Token) -> Result<(), TokenStoreError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.persist(&token)?;
        self.current.send_replace(token);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Token> {
        self.current.subscribe()
    }
}

fn validate_key(key: &str) -> Result<(), TokenStoreError> {
    let plain = !key.trim().is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\']);
    if plain {
        Ok(())
    } else {
        Err(TokenStoreError::open(format!(
            "storage key {key:?} is not a plain file name"
        )))
    }
}

fn read_token(dir: &Dir, key: &str) -> Result<Token, TokenStoreError> {
    match dir.read_to_string(key) {
        Ok(raw) => Ok(Token::new(raw.trim())),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Token::empty()),
        Err(error) => Err(TokenStoreError::read(error.to_string())),
    }
}
