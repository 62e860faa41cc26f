//! Backend selection policy.
//!
//! Environment signals (credential, compiled-in runtimes) are captured once in
//! an [`Availability`] snapshot and resolved eagerly at construction time.

use secrecy::{ExposeSecret, SecretString};

use crate::config::{BackendKind, ClassifierConfig, RemoteConfig};
use crate::error::{ClassifierError, Result};

/// What the process can offer a backend.
#[derive(Debug, Clone)]
pub struct Availability {
    /// Remote-inference credential, if any.
    pub credential: Option<SecretString>,
    /// The HTTP client is always compiled in; kept explicit for policy tests.
    pub remote_runtime: bool,
    /// Candle inference compiled in (`local` feature).
    pub local_runtime: bool,
}

impl Availability {
    /// Credential from config, else from the configured environment variable.
    /// Empty values count as absent.
    pub fn detect(remote: &RemoteConfig) -> Self {
        let credential = remote
            .api_key
            .clone()
            .filter(|k| !k.expose_secret().is_empty())
            .or_else(|| {
                std::env::var(&remote.api_key_env)
                    .ok()
                    .filter(|k| !k.is_empty())
                    .map(SecretString::from)
            });

        Self {
            credential,
            remote_runtime: true,
            local_runtime: cfg!(feature = "local"),
        }
    }
}

/// Outcome of the selection policy, before any backend is built.
#[derive(Debug)]
pub enum ResolvedBackend {
    Remote { api_key: SecretString },
    Local,
}

impl ResolvedBackend {
    pub fn kind(&self) -> BackendKind {
        match self {
            ResolvedBackend::Remote { .. } => BackendKind::Remote,
            ResolvedBackend::Local         => BackendKind::Local,
        }
    }
}

/// Apply the selection policy for `config.backend`.
pub fn resolve(config: &ClassifierConfig, availability: &Availability) -> Result<ResolvedBackend> {
    let key_env = &config.remote.api_key_env;

    match config.backend {
        BackendKind::Remote => {
            if !availability.remote_runtime {
                return Err(ClassifierError::Configuration(
                    "OpenAI client not available in this build".to_string(),
                ));
            }
            let api_key = availability.credential.clone().ok_or_else(|| {
                ClassifierError::Configuration(format!(
                    "{} environment variable not set",
                    key_env
                ))
            })?;
            Ok(ResolvedBackend::Remote { api_key })
        }

        BackendKind::Local => {
            if !availability.local_runtime {
                return Err(ClassifierError::Configuration(
                    "Local inference runtime not available; rebuild with --features local"
                        .to_string(),
                ));
            }
            Ok(ResolvedBackend::Local)
        }

        BackendKind::Auto => match (&availability.credential, availability.remote_runtime) {
            (Some(api_key), true) => {
                tracing::info!("Auto-selecting OpenAI backend");
                Ok(ResolvedBackend::Remote { api_key: api_key.clone() })
            }
            _ if availability.local_runtime => {
                tracing::info!("Auto-selecting Hugging Face backend");
                Ok(ResolvedBackend::Local)
            }
            _ => Err(ClassifierError::Configuration(format!(
                "No suitable backend available. Set {} or rebuild with --features local.",
                key_env
            ))),
        },
    }
}
