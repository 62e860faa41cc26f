//! Error types for the classifier.
//!
//! Only construction-time errors reach callers. Query-time errors are turned
//! into a conservative result by [`crate::Classifier::classify`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClassifierError>;

#[derive(Error, Debug)]
pub enum ClassifierError {
    /// No usable backend, unsupported backend name, or bad config file.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The local model could not be loaded, fallback included.
    #[error("Model loading failed for {model}: {reason}")]
    ModelLoad { model: String, reason: String },

    /// The backend was reached (or tried) and did not produce an answer.
    #[error("Backend query failed: {0}")]
    BackendQuery(String),
}

impl ClassifierError {
    pub fn model_load(model: impl Into<String>, reason: impl ToString) -> Self {
        ClassifierError::ModelLoad {
            model: model.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClassifierError {
    fn from(e: reqwest::Error) -> Self {
        ClassifierError::BackendQuery(e.to_string())
    }
}

impl From<toml::de::Error> for ClassifierError {
    fn from(e: toml::de::Error) -> Self {
        ClassifierError::Configuration(format!("invalid config file: {}", e))
    }
}

impl From<std::io::Error> for ClassifierError {
    fn from(e: std::io::Error) -> Self {
        ClassifierError::Configuration(format!("IO error: {}", e))
    }
}

#[cfg(feature = "local")]
impl From<candle_core::Error> for ClassifierError {
    fn from(e: candle_core::Error) -> Self {
        ClassifierError::BackendQuery(format!("inference error: {}", e))
    }
}

#[cfg(feature = "local")]
impl From<tokenizers::Error> for ClassifierError {
    fn from(e: tokenizers::Error) -> Self {
        ClassifierError::BackendQuery(format!("tokenizer error: {}", e))
    }
}
