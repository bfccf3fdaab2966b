//! API credential resolution
//!
//! Precedence: a key supplied by the session, then the platform secret
//! store, then the process environment. The session key is held by the
//! session itself and never written to shared process state.

use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Environment variable (and secret-store key) holding the API key
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Default location of the platform secret store
pub const DEFAULT_SECRETS_PATH: &str = ".mh-consult/secrets.toml";

/// Where a resolved credential came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Session,
    SecretStore,
    Environment,
}

impl CredentialSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::SecretStore => "secret_store",
            Self::Environment => "environment",
        }
    }
}

/// A resolved API key
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub api_key: String,
    pub source: CredentialSource,
}

// Keep keys out of logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "OPENAI_API_KEY")]
    openai_api_key: Option<String>,
}

/// Process-level credential sources, captured once at startup
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver {
    secret_store: Option<String>,
    environment: Option<String>,
}

impl CredentialResolver {
    pub fn new(secret_store: Option<String>, environment: Option<String>) -> Self {
        Self {
            secret_store: non_blank(secret_store),
            environment: non_blank(environment),
        }
    }

    /// Read the secret store file at `secrets_path` and `OPENAI_API_KEY`.
    pub fn from_env(secrets_path: &Path) -> Self {
        Self::new(
            read_secret_store(secrets_path),
            std::env::var(API_KEY_VAR).ok(),
        )
    }

    /// Pick the first available credential. Blank session keys are ignored.
    pub fn resolve(&self, session_key: Option<&str>) -> Option<Credential> {
        let session = session_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| (k.to_string(), CredentialSource::Session));

        session
            .or_else(|| {
                self.secret_store
                    .clone()
                    .map(|k| (k, CredentialSource::SecretStore))
            })
            .or_else(|| {
                self.environment
                    .clone()
                    .map(|k| (k, CredentialSource::Environment))
            })
            .map(|(api_key, source)| Credential { api_key, source })
    }

    pub fn has_process_credential(&self) -> bool {
        self.secret_store.is_some() || self.environment.is_some()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_secret_store(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<SecretsFile>(&content) {
        Ok(secrets) => secrets.openai_api_key,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable secret store");
            None
        }
    }
}
