//! Core `CommentGenerator` trait and `ApiCommentGenerator` implementation.
//!
//! `ApiCommentGenerator` calls any OpenAI-compatible `/v1/chat/completions`
//! endpoint — Ollama (OpenAI mode), OpenAI, Groq, LM Studio, vLLM, etc.
//! All connection details come from [`CommentConfig`]; nothing is hardcoded.
//!
//! The model is asked to answer with a single JSON envelope
//! `{"comment": "..."}`; any deviation (missing content, unparseable
//! envelope, transport error, timeout) is an error here and resolved by
//! [`super::FallbackGenerator`] upstream — the pipeline never sees a failed
//! comment.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::CommentConfig;

use super::prompt::PromptBuilder;

// ---------------------------------------------------------------------------
// CommentError
// ---------------------------------------------------------------------------

/// Errors that can occur during comment generation.
#[derive(Debug, Error)]
pub enum CommentError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("comment request timed out")]
    Timeout,

    /// The response could not be parsed as the expected JSON envelope.
    #[error("failed to parse comment response: {0}")]
    Parse(String),

    /// The service returned a response with no usable text content.
    #[error("service returned an empty response")]
    EmptyResponse,

    /// The remote service is disabled by configuration.
    #[error("comment generation disabled")]
    Disabled,
}

impl From<reqwest::Error> for CommentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CommentError::Timeout
        } else {
            CommentError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// CommentGenerator trait
// ---------------------------------------------------------------------------

/// Async trait for generating one empathetic comment per record.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn CommentGenerator>`).
///
/// # Arguments
/// * `transcript` – The diary transcript.
/// * `emotion`    – The label produced by classification.
/// * `score`      – Mood score 1–100; used by fallback band selection.
#[async_trait]
pub trait CommentGenerator: Send + Sync {
    async fn generate(
        &self,
        transcript: &str,
        emotion: &str,
        score: u8,
    ) -> Result<String, CommentError>;
}

// ---------------------------------------------------------------------------
// ApiCommentGenerator
// ---------------------------------------------------------------------------

/// The strict envelope the model must answer with.
#[derive(Debug, Deserialize)]
struct CommentEnvelope {
    comment: String,
}

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// # No hardcoded URLs
/// All connection details (`base_url`, `api_key`, `model`) come exclusively
/// from the [`CommentConfig`] passed to
/// [`ApiCommentGenerator::from_config`].  The per-request timeout is baked
/// into the HTTP client, so a `generate` call is always time-bounded.
pub struct ApiCommentGenerator {
    client: reqwest::Client,
    config: CommentConfig,
    prompt_builder: PromptBuilder,
}

impl ApiCommentGenerator {
    /// Build an `ApiCommentGenerator` from application config.
    ///
    /// A default (no-timeout) client is used as a last-resort fallback if
    /// the builder fails (should never happen in practice).
    pub fn from_config(config: &CommentConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            prompt_builder: PromptBuilder::new(),
        }
    }

    /// Strip markdown code fences some models wrap around JSON output.
    fn strip_fences(text: &str) -> &str {
        text.trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    }
}

#[async_trait]
impl CommentGenerator for ApiCommentGenerator {
    /// Request one comment from the configured endpoint.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty — safe for
    /// Ollama and other local providers that require no authentication.
    async fn generate(
        &self,
        transcript: &str,
        emotion: &str,
        _score: u8,
    ) -> Result<String, CommentError> {
        if !self.config.enabled {
            return Err(CommentError::Disabled);
        }

        let (system_msg, user_msg) = self.prompt_builder.build_chat(transcript, emotion);

        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": system_msg },
                { "role": "user",   "content": user_msg   }
            ],
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  128
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CommentError::Parse(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(CommentError::EmptyResponse)?;

        let envelope: CommentEnvelope = serde_json::from_str(Self::strip_fences(content))
            .map_err(|e| CommentError::Parse(e.to_string()))?;

        let comment = envelope.comment.trim().to_string();
        if comment.is_empty() {
            return Err(CommentError::EmptyResponse);
        }

        Ok(comment)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
