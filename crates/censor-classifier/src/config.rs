//! Classifier configuration.
//! Reads censor.toml from the path in CENSOR_CONFIG, else the current directory,
//! else falls back to defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};

pub const CONFIG_ENV_VAR: &str = "CENSOR_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "censor.toml";

/// Model used by the local backend when no model name is given.
pub const DEFAULT_LOCAL_MODEL: &str = "Qwen/Qwen2.5-1.5B-Instruct";
/// Small model retried once when the requested local model fails to load.
pub const FALLBACK_LOCAL_MODEL: &str = "Qwen/Qwen2.5-0.5B-Instruct";

/// Which backend to use. `Auto` is only meaningful before selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackendKind {
    #[serde(rename = "openai", alias = "remote")]
    Remote,
    #[serde(rename = "huggingface", alias = "local")]
    Local,
    #[default]
    #[serde(rename = "auto")]
    Auto,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Remote => "openai",
            BackendKind::Local  => "huggingface",
            BackendKind::Auto   => "auto",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "openai" | "remote"     => Ok(BackendKind::Remote),
            "huggingface" | "local" => Ok(BackendKind::Local),
            "auto"                  => Ok(BackendKind::Auto),
            other => Err(ClassifierError::Configuration(format!(
                "Unsupported backend: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Local model id on the Hugging Face Hub.
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Takes precedence over the environment variable when non-empty.
    #[serde(default)]
    pub api_key: Option<SecretString>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_remote_model() -> String { "gpt-4o-mini".to_string() }
fn default_base_url()     -> String { "https://api.openai.com/v1".to_string() }
fn default_api_key_env()  -> String { "OPENAI_API_KEY".to_string() }
fn default_timeout_secs() -> u64    { 30 }

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            model: default_remote_model(),
            base_url: default_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,
    #[serde(default = "default_max_input_tokens")]
    pub max_input_tokens: usize,
    /// Use CUDA/Metal when compiled in and present.
    #[serde(default = "bool_true")]
    pub use_gpu: bool,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Hugging Face cache directory; the hub default when unset.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_fallback_model()   -> String { FALLBACK_LOCAL_MODEL.to_string() }
fn default_max_input_tokens() -> usize  { 1024 }
fn bool_true()                -> bool   { true }
fn default_seed()             -> u64    { 299_792_458 }

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            fallback_model: default_fallback_model(),
            max_input_tokens: default_max_input_tokens(),
            use_gpu: bool_true(),
            seed: default_seed(),
            cache_dir: None,
        }
    }
}

/// Sampling settings shared by both backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: usize,
}

fn default_temperature()    -> f64   { 0.1 }
fn default_max_new_tokens() -> usize { 150 }

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_new_tokens: default_max_new_tokens(),
        }
    }
}

impl ClassifierConfig {
    /// Load from `$CENSOR_CONFIG`, else `./censor.toml`, else defaults.
    ///
    /// A path set through the environment must exist; the implicit
    /// `./censor.toml` is optional.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(path);
        }
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_file(DEFAULT_CONFIG_FILE);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifierError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    /// Point the remote backend at another OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.remote.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.remote.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// The local model to load: `model_name`, else the built-in default.
    pub fn local_model(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_LOCAL_MODEL)
    }
}
