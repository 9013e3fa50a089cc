//! Embedding Client — the single point of entry for embedding provider calls.
//!
//! Talks to an OpenAI-compatible `/v1/embeddings` endpoint. There is no retry
//! logic here: callers own the fallback policy (see `selection::semantic`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::EmbeddingConfig;
use crate::selection::similarity::EmbeddingVector;

/// Upper bound on characters sent per request. Job descriptions can be long;
/// this only guards against pathological payloads.
pub const MAX_INPUT_CHARS: usize = 32_000;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed embedding response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No embedding data received from provider")]
    EmptyData,

    #[error("No embedding API key configured")]
    MissingApiKey,
}

/// Anything that can turn text into a vector. The scorer depends on this trait
/// so tests can substitute deterministic fakes.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl EmbeddingClient {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config
                .api_key
                .as_ref()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let api_key = self.api_key.as_deref().ok_or(EmbeddingError::MissingApiKey)?;
        let input = truncate_chars(text, MAX_INPUT_CHARS);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let parsed: EmbeddingResponse = serde_json::from_slice(&body)?;
        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or(EmbeddingError::EmptyData)?;

        debug!(
            "Embedded {} chars with {} → {} dims",
            input.chars().count(),
            self.model,
            vector.len()
        );

        Ok(vector)
    }
}

/// Returns at most `max` characters of `text`, cutting on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
