//! Shared plumbing for the `censor-classify` and `censor-smoke` binaries.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use censor_classifier::{BackendKind, ClassificationInput, ClassificationResult, ClassifierConfig};
use tracing_subscriber::EnvFilter;

/// Structured logging to stderr; stdout is reserved for results.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("censor_classifier=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Config from an explicit file, else the default lookup, then CLI overrides.
pub fn load_config(
    path: Option<&Path>,
    backend: Option<BackendKind>,
    model: Option<String>,
) -> anyhow::Result<ClassifierConfig> {
    let mut config = match path {
        Some(path) => ClassifierConfig::from_file(path)?,
        None => ClassifierConfig::load()?,
    };
    if let Some(backend) = backend {
        config.backend = backend;
    }
    if let Some(model) = model {
        config.model_name = Some(model);
    }
    Ok(config)
}

/// Parse the CLI's JSON argument.
pub fn parse_input(raw: &str) -> anyhow::Result<ClassificationInput> {
    serde_json::from_str(raw).map_err(|_| anyhow::anyhow!("Invalid JSON input"))
}

pub fn action_scene_sample() -> ClassificationInput {
    sample(
        "Action scene with characters fighting, mild violence, no explicit content",
        &["action", "fighting", "characters", "outdoor"],
    )
}

pub fn family_sample() -> ClassificationInput {
    sample(
        "Family-friendly content with no violence or inappropriate material",
        &["family", "happy", "outdoor", "nature"],
    )
}

fn sample(transcript: &str, labels: &[&str]) -> ClassificationInput {
    let mut metadata = serde_json::Map::new();
    metadata.insert("filename".to_string(), "test_video.mp4".into());
    metadata.insert("duration".to_string(), 120.into());
    ClassificationInput::new(
        metadata,
        transcript,
        labels.iter().map(|l| l.to_string()).collect(),
    )
}

/// POST `input` to `<base_url>/classify` and check the `{rating, reason}` shape.
///
/// Deserializing into [`ClassificationResult`] rejects out-of-taxonomy ratings.
pub async fn check_service(
    base_url: &str,
    input: &ClassificationInput,
    timeout: Duration,
) -> anyhow::Result<ClassificationResult> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let url = format!("{}/classify", base_url.trim_end_matches('/'));

    let resp = client
        .post(&url)
        .json(input)
        .send()
        .await
        .with_context(|| format!("could not reach {}", url))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("{} returned {}: {}", url, status, body);
    }

    resp.json::<ClassificationResult>()
        .await
        .context("response is not a {rating, reason} object with a valid rating")
}
