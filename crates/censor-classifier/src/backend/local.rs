//! In-process causal language model backend using Candle.
//!
//! Loads a Qwen2-family model and tokenizer from the Hugging Face Hub and
//! generates on a blocking worker. The model sits behind a mutex, so
//! concurrent queries on one backend run one at a time.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::qwen2::{Config as Qwen2Config, ModelForCausalLM};
use hf_hub::api::sync::{Api, ApiBuilder, ApiRepo};
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;
use tracing::{debug, error, info};

use super::device::select_device;
use crate::config::{ClassifierConfig, LocalConfig};
use crate::error::{ClassifierError, Result};

/// Returned in place of model output when local generation fails.
pub const MODEL_ERROR_RESPONSE: &str =
    r#"{"rating": "12+", "reason": "Unable to classify content due to model error"}"#;

const EOS_TOKENS: [&str; 2] = ["<|im_end|>", "<|endoftext|>"];

#[derive(Debug, Clone)]
struct SamplingParams {
    max_input_tokens: usize,
    max_new_tokens: usize,
    temperature: f64,
    seed: u64,
}

struct LoadedModel {
    model: ModelForCausalLM,
    tokenizer: Tokenizer,
    device: Device,
    eos_tokens: Vec<u32>,
}

pub struct LocalBackend {
    model_id: String,
    inner: Arc<Mutex<LoadedModel>>,
    params: SamplingParams,
}

impl LocalBackend {
    /// Load the configured model, retrying once with the fallback model.
    pub async fn load(config: &ClassifierConfig) -> Result<Self> {
        let requested = config.local_model().to_string();
        let fallback = config.local.fallback_model.clone();
        let local = config.local.clone();

        let (model_id, loaded) = tokio::task::spawn_blocking(move || {
            load_with_fallback(&requested, &fallback, |id| LoadedModel::load(id, &local))
        })
        .await
        .map_err(|e| ClassifierError::model_load(config.local_model(), e))??;

        Ok(Self {
            model_id,
            inner: Arc::new(Mutex::new(loaded)),
            params: SamplingParams {
                max_input_tokens: config.local.max_input_tokens,
                max_new_tokens: config.generation.max_new_tokens,
                temperature: config.generation.temperature,
                seed: config.local.seed,
            },
        })
    }

    /// Generate a completion. Never returns `Err`: failures are logged and
    /// replaced with [`MODEL_ERROR_RESPONSE`].
    pub async fn query(&self, prompt: &str) -> Result<String> {
        let inner = Arc::clone(&self.inner);
        let prompt = prompt.to_string();
        let params = self.params.clone();

        let joined = tokio::task::spawn_blocking(move || {
            // generate() resets the KV cache first, so a poisoned lock is safe to reuse.
            let mut model = inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            model.generate(&prompt, &params)
        })
        .await;

        let generated = match joined {
            Ok(result) => result,
            Err(e) => Err(ClassifierError::BackendQuery(format!(
                "generation task failed: {}",
                e
            ))),
        };

        match generated {
            Ok(text) => Ok(text),
            Err(e) => {
                error!(model = %self.model_id, "Hugging Face model error: {}", e);
                Ok(MODEL_ERROR_RESPONSE.to_string())
            }
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Try `requested`, then `fallback` once. Returns the id that loaded.
pub(crate) fn load_with_fallback<T, F>(
    requested: &str,
    fallback: &str,
    mut load: F,
) -> Result<(String, T)>
where
    F: FnMut(&str) -> Result<T>,
{
    let first = match load(requested) {
        Ok(model) => return Ok((requested.to_string(), model)),
        Err(e) => e,
    };
    error!("Failed to load model {}: {}", requested, first);

    if requested == fallback {
        return Err(ClassifierError::model_load(requested, first));
    }

    info!("Falling back to {}", fallback);
    load(fallback)
        .map(|model| (fallback.to_string(), model))
        .map_err(|second| {
            ClassifierError::model_load(
                fallback,
                format!("{} (requested {} failed: {})", second, requested, first),
            )
        })
}

impl LoadedModel {
    fn load(model_id: &str, local: &LocalConfig) -> Result<Self> {
        let start = Instant::now();
        info!("Loading model: {}", model_id);
        let fail = |e: &dyn std::fmt::Display| ClassifierError::model_load(model_id, e);

        let (device, dtype) = select_device(local.use_gpu);
        debug!("Using device: {:?}, dtype: {:?}", device, dtype);

        let api = match &local.cache_dir {
            Some(dir) => ApiBuilder::new().with_cache_dir(dir.clone()).build(),
            None => Api::new(),
        }
        .map_err(|e| fail(&e))?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let tokenizer_path = repo.get("tokenizer.json").map_err(|e| fail(&e))?;
        let config_path = repo.get("config.json").map_err(|e| fail(&e))?;
        let weights = weight_files(&repo).map_err(|e| fail(&e))?;
        debug!("Model files at {:?}", weights);

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| fail(&e))?;
        let raw_config = std::fs::read(&config_path).map_err(|e| fail(&e))?;
        let config: Qwen2Config = serde_json::from_slice(&raw_config).map_err(|e| fail(&e))?;

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(weights.as_slice(), dtype, &device) }
            .map_err(|e| fail(&e))?;
        let model = ModelForCausalLM::new(&config, vb).map_err(|e| fail(&e))?;

        let eos_tokens: Vec<u32> = EOS_TOKENS
            .iter()
            .filter_map(|t| tokenizer.token_to_id(t))
            .collect();

        info!("Model {} loaded in {:.2}s", model_id, start.elapsed().as_secs_f32());
        Ok(Self {
            model,
            tokenizer,
            device,
            eos_tokens,
        })
    }

    fn generate(&mut self, prompt: &str, params: &SamplingParams) -> Result<String> {
        let encoding = self.tokenizer.encode(prompt, true)?;
        let mut tokens: Vec<u32> = encoding.get_ids().to_vec();
        tokens.truncate(params.max_input_tokens);
        if tokens.is_empty() {
            return Err(ClassifierError::BackendQuery("prompt produced no tokens".to_string()));
        }
        let prompt_len = tokens.len();

        let temperature = (params.temperature > 0.0).then_some(params.temperature);
        let mut logits_processor = LogitsProcessor::new(params.seed, temperature, None);

        self.model.clear_kv_cache();
        for index in 0..params.max_new_tokens {
            let context_size = if index > 0 { 1 } else { tokens.len() };
            let start_pos = tokens.len().saturating_sub(context_size);
            let input = Tensor::new(&tokens[start_pos..], &self.device)?.unsqueeze(0)?;
            let logits = self.model.forward(&input, start_pos)?;
            let logits = logits.squeeze(0)?.squeeze(0)?.to_dtype(DType::F32)?;

            let next = logits_processor.sample(&logits)?;
            if self.eos_tokens.contains(&next) {
                break;
            }
            tokens.push(next);
        }
        self.model.clear_kv_cache();

        let text = self.tokenizer.decode(&tokens[prompt_len..], true)?;
        Ok(text.trim().to_string())
    }
}

/// Single-file weights, or every shard listed in the safetensors index.
fn weight_files(repo: &ApiRepo) -> std::result::Result<Vec<PathBuf>, String> {
    if let Ok(path) = repo.get("model.safetensors") {
        return Ok(vec![path]);
    }

    let index_path = repo
        .get("model.safetensors.index.json")
        .map_err(|e| format!("no safetensors weights: {}", e))?;
    let index: serde_json::Value = std::fs::read(&index_path)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_slice(&raw).map_err(|e| e.to_string()))?;

    let weight_map = index["weight_map"]
        .as_object()
        .ok_or_else(|| "safetensors index has no weight_map".to_string())?;
    let mut shards: Vec<&str> = weight_map.values().filter_map(|v| v.as_str()).collect();
    shards.sort_unstable();
    shards.dedup();

    shards
        .into_iter()
        .map(|shard| repo.get(shard).map_err(|e| format!("{}: {}", shard, e)))
        .collect()
}
