//! Inference backends.
//!
//! Backends:
//!   RemoteBackend: OpenAI chat completions (or any compatible endpoint)
//!   LocalBackend:  in-process Qwen2 causal LM via Candle (`local` feature)
//!
//! Both turn a prompt into raw, unvalidated text. They fail differently:
//! remote errors propagate to the orchestrator, local errors are replaced
//! by a fixed 12+ response inside the backend.

pub mod remote;
#[cfg(feature = "local")]
pub mod device;
#[cfg(feature = "local")]
pub mod local;

use tracing::info;

use crate::config::{BackendKind, ClassifierConfig};
use crate::error::Result;
use crate::selector::{resolve, Availability, ResolvedBackend};

pub use remote::RemoteBackend;
#[cfg(feature = "local")]
pub use local::LocalBackend;

pub enum Backend {
    Remote(RemoteBackend),
    #[cfg(feature = "local")]
    Local(LocalBackend),
}

impl Backend {
    /// Resolve the selection policy and build the chosen backend.
    /// Loading a local model happens here, eagerly.
    pub async fn select(config: &ClassifierConfig, availability: &Availability) -> Result<Self> {
        match resolve(config, availability)? {
            ResolvedBackend::Remote { api_key } => {
                let backend = RemoteBackend::new(api_key, &config.remote, &config.generation)?;
                info!(model = backend.model_id(), "OpenAI backend initialized");
                Ok(Backend::Remote(backend))
            }
            ResolvedBackend::Local => Self::load_local(config).await,
        }
    }

    #[cfg(feature = "local")]
    async fn load_local(config: &ClassifierConfig) -> Result<Self> {
        let backend = LocalBackend::load(config).await?;
        info!(model = backend.model_id(), "Hugging Face backend initialized");
        Ok(Backend::Local(backend))
    }

    #[cfg(not(feature = "local"))]
    async fn load_local(_config: &ClassifierConfig) -> Result<Self> {
        Err(crate::error::ClassifierError::Configuration(
            "Local inference runtime not available; rebuild with --features local".to_string(),
        ))
    }

    pub async fn query(&self, prompt: &str) -> Result<String> {
        match self {
            Backend::Remote(b) => b.query(prompt).await,
            #[cfg(feature = "local")]
            Backend::Local(b) => b.query(prompt).await,
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Remote(_) => BackendKind::Remote,
            #[cfg(feature = "local")]
            Backend::Local(_) => BackendKind::Local,
        }
    }

    pub fn model_id(&self) -> &str {
        match self {
            Backend::Remote(b) => b.model_id(),
            #[cfg(feature = "local")]
            Backend::Local(b) => b.model_id(),
        }
    }
}
