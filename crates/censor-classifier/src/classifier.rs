//! Classification orchestrator: prompt → backend → parser.
//!
//! [`Classifier::classify`] is total. Unusable model output comes back as
//! 12+ from the parser; a failed pipeline comes back as 18+ from here.

use std::time::Instant;

use tracing::{error, info};

use crate::audit::{ClassificationAudit, Outcome};
use crate::backend::Backend;
use crate::config::{BackendKind, ClassifierConfig};
use crate::error::{ClassifierError, Result};
use crate::parser::parse_with_outcome;
use crate::prompt::build_prompt;
use crate::rating::{ClassificationInput, ClassificationResult, Rating};
use crate::selector::Availability;

/// Rating returned when classification could not be performed at all.
pub const FAILURE_RATING: Rating = Rating::Eighteen;

/// Content classifier bound to one resolved backend.
///
/// Build once and reuse; construction may load a local model.
pub struct Classifier {
    backend: Backend,
    config: ClassifierConfig,
}

impl Classifier {
    /// Select and build the backend, reading availability from the environment.
    pub async fn new(config: ClassifierConfig) -> Result<Self> {
        let availability = Availability::detect(&config.remote);
        Self::with_availability(config, &availability).await
    }

    /// Select and build the backend against an explicit availability snapshot.
    pub async fn with_availability(
        config: ClassifierConfig,
        availability: &Availability,
    ) -> Result<Self> {
        let backend = Backend::select(&config, availability).await?;
        info!(
            backend = backend.kind().as_str(),
            model = backend.model_id(),
            "Classifier ready"
        );
        Ok(Self { backend, config })
    }

    /// Classify one piece of content. Always returns a valid rating.
    pub async fn classify(&self, input: &ClassificationInput) -> ClassificationResult {
        let start = Instant::now();
        let prompt = build_prompt(input);

        let (result, outcome, raw) = match self.backend.query(&prompt).await {
            Ok(raw) => {
                let (result, outcome) = parse_with_outcome(&raw);
                (result, outcome, Some(raw))
            }
            Err(e) => {
                error!("Classification error: {}", e);
                (failure_result(&e), Outcome::Failed, None)
            }
        };

        ClassificationAudit::new(
            self.backend.kind(),
            self.backend.model_id(),
            result.rating,
            outcome,
            raw.as_deref(),
            start.elapsed().as_millis() as u64,
        )
        .emit();
        info!(rating = result.rating.as_str(), reason = %result.reason, "Classification result");

        result
    }

    pub async fn classify_parts(
        &self,
        metadata: serde_json::Map<String, serde_json::Value>,
        transcript: impl Into<String>,
        vision_labels: Vec<String>,
    ) -> ClassificationResult {
        self.classify(&ClassificationInput::new(metadata, transcript, vision_labels))
            .await
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn model_id(&self) -> &str {
        self.backend.model_id()
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }
}

fn failure_result(e: &ClassifierError) -> ClassificationResult {
    ClassificationResult::new(FAILURE_RATING, format!("Classification failed: {}", e))
}
