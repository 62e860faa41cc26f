//! Per-call audit record for classifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::BackendKind;
use crate::rating::Rating;

/// How the returned result was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Model output was valid and returned unchanged.
    Parsed,
    /// Model gave an out-of-taxonomy rating; replaced with 12+.
    Corrected,
    /// Model output was unusable; 12+ default.
    Defaulted,
    /// The pipeline failed; 18+ default.
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Parsed    => "parsed",
            Outcome::Corrected => "corrected",
            Outcome::Defaulted => "defaulted",
            Outcome::Failed    => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationAudit {
    pub id: Uuid,
    pub backend: BackendKind,
    pub model: String,
    pub rating: Rating,
    pub outcome: Outcome,
    /// Hex SHA-256 of the raw backend output; empty if the query failed.
    pub output_hash: String,
    pub latency_ms: u64,
    pub classified_at: DateTime<Utc>,
}

impl ClassificationAudit {
    pub fn new(
        backend: BackendKind,
        model: impl Into<String>,
        rating: Rating,
        outcome: Outcome,
        raw_output: Option<&str>,
        latency_ms: u64,
    ) -> Self {
        let output_hash = raw_output.map(sha256_hex).unwrap_or_default();

        Self {
            id: Uuid::new_v4(),
            backend,
            model: model.into(),
            rating,
            outcome,
            output_hash,
            latency_ms,
            classified_at: Utc::now(),
        }
    }

    pub fn emit(&self) {
        tracing::info!(
            audit_id = %self.id,
            backend = self.backend.as_str(),
            model = %self.model,
            rating = self.rating.as_str(),
            outcome = self.outcome.as_str(),
            output_hash = %self.output_hash,
            latency_ms = self.latency_ms,
            "Classification audit"
        );
    }
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
