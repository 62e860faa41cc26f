//! Hosted chat-completions backend (OpenAI or any compatible endpoint).

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error};

use crate::config::{GenerationConfig, RemoteConfig};
use crate::error::{ClassifierError, Result};

/// System message sent with every request.
pub const SYSTEM_PROMPT: &str =
    "You are a content rating classifier. Always respond with valid JSON.";

pub struct RemoteBackend {
    pub model: String,
    base_url: String,
    api_key: SecretString,
    temperature: f64,
    max_tokens: usize,
    client: reqwest::Client,
}

impl RemoteBackend {
    pub fn new(
        api_key: SecretString,
        remote: &RemoteConfig,
        generation: &GenerationConfig,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(remote.timeout_secs))
            .build()
            .map_err(|e| ClassifierError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            model: remote.model.clone(),
            base_url: remote.base_url.trim_end_matches('/').to_string(),
            api_key,
            temperature: generation.temperature,
            max_tokens: generation.max_new_tokens,
            client,
        })
    }

    pub async fn query(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model":       &self.model,
            "messages":    [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user",   "content": prompt},
            ],
            "max_tokens":  self.max_tokens,
            "temperature": self.temperature,
        });

        let result: Result<String> = async {
            let resp = self.client
                .post(&url)
                .bearer_auth(self.api_key.expose_secret())
                .json(&body)
                .send()
                .await?;
            let json = check_response_status(resp).await?;
            completion_content(&json)
        }
        .await;

        match result {
            Ok(content) => {
                debug!(model = %self.model, chars = content.len(), "Remote completion received");
                Ok(content)
            }
            Err(e) => {
                error!("OpenAI API error: {}", e);
                Err(e)
            }
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model
    }
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value> {
    let status = resp.status().as_u16();
    if status >= 400 {
        let text = resp.text().await.unwrap_or_default();
        return Err(ClassifierError::BackendQuery(format!(
            "API error [{}]: {}",
            status,
            error_message(&text)
        )));
    }
    Ok(resp.json().await?)
}

/// OpenAI-style `{"error": {"message"}}`, a bare `{"message"}`, or the raw body.
fn error_message(text: &str) -> String {
    if let Ok(body) = serde_json::from_str::<serde_json::Value>(text) {
        if let Some(msg) = body["error"]["message"]
            .as_str()
            .or_else(|| body["message"].as_str())
        {
            return msg.to_string();
        }
    }
    match text.trim() {
        "" => "unknown API error".to_string(),
        raw => raw.to_string(),
    }
}

fn completion_content(json: &serde_json::Value) -> Result<String> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            ClassifierError::BackendQuery("completion has no message content".to_string())
        })
}
