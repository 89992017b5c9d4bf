//! Configuration for the Echo relay.
//!
//! Values come from the process environment (optionally seeded from a `.env`
//! file). Only the provider credential is mandatory.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::conversation::core::errors::{ChatError, ChatResult};
use crate::llm::persona::DEFAULT_SYSTEM_PROMPT;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable overriding the Gemini model name.
pub const MODEL_ENV: &str = "GEMINI_MODEL";
/// Environment variable overriding the Gemini API base URL.
pub const BASE_URL_ENV: &str = "GEMINI_BASE_URL";
/// Environment variable overriding the provider request timeout.
pub const TIMEOUT_ENV: &str = "GEMINI_TIMEOUT_SECS";
/// Environment variable pointing at a file that replaces the built-in persona.
pub const SYSTEM_PROMPT_FILE_ENV: &str = "ECHO_SYSTEM_PROMPT_FILE";
/// Environment variable overriding the `SQLite` database path.
pub const DATABASE_PATH_ENV: &str = "ECHO_DATABASE_PATH";
/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "ECHO_PORT";
/// Environment variable overriding the listen address.
pub const HOST_ENV: &str = "ECHO_HOST";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EchoConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Persistence settings.
    pub storage: StorageConfig,
    /// Model provider settings.
    pub provider: ProviderConfig,
}

impl EchoConfig {
    /// Load configuration from the process environment, reading `.env` first if present.
    ///
    /// # Errors
    /// Returns an error if the API key is missing or any value is invalid.
    pub fn from_env() -> ChatResult<Self> {
        if dotenv::dotenv().is_ok() {
            tracing::debug!("Loaded variables from .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns an error if the API key is missing or any value is invalid.
    pub fn from_lookup<F>(lookup: F) -> ChatResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.provider.api_key = lookup(API_KEY_ENV)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ChatError::MissingCredential(API_KEY_ENV))?;

        if let Some(model) = lookup(MODEL_ENV) {
            config.provider.model = model;
        }
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config.provider.base_url = base_url;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            config.provider.timeout_secs = parse_value(TIMEOUT_ENV, &raw)?;
        }
        if let Some(path) = lookup(SYSTEM_PROMPT_FILE_ENV) {
            config.provider.system_prompt = std::fs::read_to_string(&path)?;
            tracing::info!("Loaded system prompt from {path}");
        }
        if let Some(path) = lookup(DATABASE_PATH_ENV) {
            config.storage.sqlite_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(PORT_ENV) {
            config.server.port = parse_value(PORT_ENV, &raw)?;
        }
        if let Some(host) = lookup(HOST_ENV) {
            config.server.host = host;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ChatResult<()> {
        if self.server.port == 0 {
            return Err(ChatError::InvalidConfig("server.port must be > 0".to_string()));
        }

        if self.provider.model.trim().is_empty() {
            return Err(ChatError::InvalidConfig(
                "provider.model must not be empty".to_string(),
            ));
        }

        if self.provider.timeout_secs == 0 {
            return Err(ChatError::InvalidConfig(
                "provider.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.provider.system_prompt.trim().is_empty() {
            return Err(ChatError::InvalidConfig(
                "provider.system_prompt must not be empty".to_string(),
            ));
        }

        Url::parse(&self.provider.base_url)?;

        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> ChatResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| ChatError::InvalidConfig(format!("{key} has an invalid value: {raw}")))
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Storage configuration for conversations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("chat_history.db"),
        }
    }
}

/// Model provider settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Gemini API key.
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Gemini model name.
    pub model: String,
    /// API base URL.
    pub base_url: String,
    /// Overall request timeout in seconds.
    pub timeout_secs: u64,
    /// Persona instruction applied to every conversation.
    pub system_prompt: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 60,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("system_prompt_chars", &self.system_prompt.chars().count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_key_only() {
        let config = EchoConfig::from_lookup(lookup_from(&[(API_KEY_ENV, "secret")])).unwrap();
        assert_eq!(config.provider.api_key, "secret");
        assert_eq!(config.provider.model, "gemini-2.5-flash");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.sqlite_path, PathBuf::from("chat_history.db"));
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let err = EchoConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ChatError::MissingCredential(API_KEY_ENV)));

        let err = EchoConfig::from_lookup(lookup_from(&[(API_KEY_ENV, "  ")])).unwrap_err();
        assert!(matches!(err, ChatError::MissingCredential(_)));
    }

    #[test]
    fn test_overrides() {
        let config = EchoConfig::from_lookup(lookup_from(&[
            (API_KEY_ENV, "secret"),
            (MODEL_ENV, "gemini-2.5-pro"),
            (PORT_ENV, "8080"),
            (TIMEOUT_ENV, "15"),
            (DATABASE_PATH_ENV, "/tmp/echo.db"),
        ]))
        .unwrap();
        assert_eq!(config.provider.model, "gemini-2.5-pro");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.provider.timeout_secs, 15);
        assert_eq!(config.storage.sqlite_path, PathBuf::from("/tmp/echo.db"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EchoConfig::from_lookup(lookup_from(&[(API_KEY_ENV, "k"), (PORT_ENV, "http")]))
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidConfig(_)));

        let err = EchoConfig::from_lookup(lookup_from(&[(API_KEY_ENV, "k"), (TIMEOUT_ENV, "0")]))
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidConfig(_)));

        let err = EchoConfig::from_lookup(lookup_from(&[(API_KEY_ENV, "k"), (BASE_URL_ENV, "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ChatError::Url(_)));
    }

    #[test]
    fn test_system_prompt_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Be brief.").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = EchoConfig::from_lookup(lookup_from(&[
            (API_KEY_ENV, "k"),
            (SYSTEM_PROMPT_FILE_ENV, path.as_str()),
        ]))
        .unwrap();
        assert_eq!(config.provider.system_prompt, "Be brief.");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut config = ProviderConfig::default();
        config.api_key = "super-secret".to_string();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
