//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `FLASHCOURT_*` environment variables or a configuration
//! file; command-line overrides are applied by the binary.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::outbound::{DEFAULT_REQUEST_TIMEOUT, FileTokenStore};

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TOKEN_DIR: &str = ".flashcourt";

/// Errors raised while interpreting configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL does not parse.
    #[error("invalid base URL {value:?}: {source}")]
    InvalidBaseUrl {
        /// Offending value.
        value: String,
        /// Parser diagnostics.
        #[source]
        source: url::ParseError,
    },
    /// The base URL cannot carry paths (for example `mailto:`).
    #[error("base URL {value:?} must be an http or https URL")]
    UnsupportedBaseUrl {
        /// Offending value.
        value: String,
    },
}

/// Connection and storage settings for the reservation client.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FLASHCOURT")]
pub struct ClientSettings {
    /// Server root every API path is appended to.
    pub base_url: Option<String>,
    /// Global request timeout in milliseconds; zero means the default.
    #[ortho_config(default = 15_000)]
    pub timeout_ms: u64,
    /// Directory holding the token file.
    pub token_dir: Option<String>,
    /// Token file name.
    pub token_key: Option<String>,
}

impl ClientSettings {
    /// Parsed base URL, falling back to a local server.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the value is not an http(s) URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let value = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let url = Url::parse(value).map_err(|source| ConfigError::InvalidBaseUrl {
            value: value.to_owned(),
            source,
        })?;
        if matches!(url.scheme(), "http" | "https") {
            Ok(url)
        } else {
            Err(ConfigError::UnsupportedBaseUrl {
                value: value.to_owned(),
            })
        }
    }

    /// Request timeout; zero or unset means the 15 second default.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        match self.timeout_ms {
            0 => DEFAULT_REQUEST_TIMEOUT,
            ms => Duration::from_millis(ms),
        }
    }

    /// Directory for the token file.
    #[must_use]
    pub fn token_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.token_dir.as_deref().unwrap_or(DEFAULT_TOKEN_DIR))
    }

    /// Token file name.
    #[must_use]
    pub fn token_key(&self) -> &str {
        self.token_key
            .as_deref()
            .unwrap_or(FileTokenStore::DEFAULT_KEY)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "FLASHCOURT_BASE_URL",
        "FLASHCOURT_TIMEOUT_MS",
        "FLASHCOURT_TOKEN_DIR",
        "FLASHCOURT_TOKEN_KEY",
    ];

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("flashcourt")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.base_url().expect("default url").as_str(),
            "http://localhost:8080/"
        );
        assert_eq!(settings.timeout_ms, 15_000);
        assert_eq!(settings.timeout(), Duration::from_secs(15));
        assert_eq!(settings.token_dir(), Utf8PathBuf::from(".flashcourt"));
        assert_eq!(settings.token_key(), "bf_token");
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("FLASHCOURT_BASE_URL", Some("https://courts.example.test/api".to_owned())),
            ("FLASHCOURT_TIMEOUT_MS", Some("2500".to_owned())),
            ("FLASHCOURT_TOKEN_DIR", Some("/tmp/flashcourt".to_owned())),
            ("FLASHCOURT_TOKEN_KEY", Some("session".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.base_url().expect("url").as_str(),
            "https://courts.example.test/api"
        );
        assert_eq!(settings.timeout(), Duration::from_millis(2500));
        assert_eq!(settings.token_dir(), Utf8PathBuf::from("/tmp/flashcourt"));
        assert_eq!(settings.token_key(), "session");
    }

    #[rstest]
    #[case::not_a_url("not a url")]
    #[case::wrong_scheme("mailto:ops@example.test")]
    fn rejects_unusable_base_urls(#[case] value: &str) {
        let settings = ClientSettings {
            base_url: Some(value.to_owned()),
            ..ClientSettings::default()
        };
        assert!(settings.base_url().is_err());
    }

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let settings = ClientSettings {
            timeout_ms: 0,
            ..ClientSettings::default()
        };
        assert_eq!(settings.timeout(), DEFAULT_REQUEST_TIMEOUT);
    }
}
