//! Gemini generation client.
//!
//! Talks to the Generative Language REST API: one `generateContent` request
//! per summary and a paginated `models` listing for the model picker.
//! Requests are never retried or streamed.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::{PrecisError, Result};

/// Model used when none is selected.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Sampling temperature used for summaries.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Production endpoint of the Generative Language API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Environment variable overriding [`DEFAULT_API_BASE`].
pub const API_BASE_VAR: &str = "GEMINI_API_BASE";

const GENERATE_METHOD: &str = "generateContent";
const MODEL_PREFIX: &str = "models/";

/// Anything that turns a prompt into generated text.
///
/// [`GeminiClient`] is the production implementation; the summarizer only
/// depends on this trait.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Identifier of the model answering requests.
    fn model_name(&self) -> &str;

    /// Sends `prompt` with the given sampling `temperature` and returns the text.
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String>;
}

/// Connection settings for [`GeminiClient`].
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: DEFAULT_MODEL.to_string(), api_base: DEFAULT_API_BASE.to_string() }
    }

    /// Reads [`API_KEY_VAR`] and [`API_BASE_VAR`] from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(missing_key)?;

        let mut config = Self::new(api_key);
        if let Some(base) = lookup(API_BASE_VAR).filter(|base| !base.trim().is_empty()) {
            config.api_base = base;
        }

        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

fn missing_key() -> PrecisError {
    PrecisError::Configuration(format!(
        "{API_KEY_VAR} not found in environment. Add it to your .env file: {API_KEY_VAR}=your_key_here"
    ))
}

/// Client for a single configured credential and a selected model.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Creates a client, failing with [`PrecisError::Configuration`] on an empty key.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(missing_key());
        }

        let http = Client::builder()
            .build()
            .map_err(|e| PrecisError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Creates a client from the environment, optionally overriding the model.
    pub fn from_env(model: Option<&str>) -> Result<Self> {
        let mut config = GeminiConfig::from_env()?;
        if let Some(model) = model {
            config.model = model.to_string();
        }
        Self::new(config)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Switches the model used by later requests; the connection is kept.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model = model.into();
        tracing::info!(model = %self.config.model, "switched model");
    }

    /// Lists models supporting content generation, sorted, without the `models/` prefix.
    ///
    /// Failures are logged and yield an empty list so callers can fall back
    /// to [`DEFAULT_MODEL`].
    pub async fn list_models(&self) -> Vec<String> {
        match self.try_list_models().await {
            Ok(models) => models,
            Err(err) => {
                tracing::warn!(error = %err, "could not list models");
                Vec::new()
            }
        }
    }

    async fn try_list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/v1beta/models", self.api_base());
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(&url)
                .header("x-goog-api-key", &self.config.api_key)
                .query(&[("pageSize", "1000")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await.map_err(transport_error)?;
            let page: ListModelsResponse = parse_response(response).await?;

            names.extend(
                page.models
                    .into_iter()
                    .filter(|model| model.supported_generation_methods.iter().any(|m| m == GENERATE_METHOD))
                    .map(|model| strip_model_prefix(&model.name).to_string()),
            );

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        names.sort();
        names.dedup();
        Ok(names)
    }

    fn api_base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }
}

#[async_trait]
impl Generator for GeminiClient {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:{}",
            self.api_base(),
            strip_model_prefix(&self.config.model),
            GENERATE_METHOD
        );
        let body = GenerateContentRequest {
            contents: vec![Content { parts: vec![Part { text: Some(prompt.to_string()) }] }],
            generation_config: GenerationConfig { temperature },
        };

        tracing::debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending generation request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let reply: GenerateContentResponse = parse_response(response).await?;
        reply.text()
    }
}

/// Strips the `models/` namespace from a model resource name.
pub fn strip_model_prefix(name: &str) -> &str {
    name.strip_prefix(MODEL_PREFIX).unwrap_or(name)
}

fn transport_error(err: reqwest::Error) -> PrecisError {
    PrecisError::Unexpected(err.to_string())
}

async fn parse_response<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        let api_error = serde_json::from_str::<ErrorEnvelope>(&body).ok().map(|e| e.error);
        let quota = status.as_u16() == 429
            || api_error.as_ref().is_some_and(|e| e.status.as_deref() == Some("RESOURCE_EXHAUSTED"));

        if quota {
            tracing::warn!(status = status.as_u16(), "generation quota exhausted");
            return Err(PrecisError::quota_exceeded());
        }

        let message = api_error.and_then(|e| e.message).unwrap_or(body);
        return Err(PrecisError::Unexpected(format!("{}: {}", status, message.trim())));
    }

    serde_json::from_str(&body).map_err(|e| PrecisError::Unexpected(format!("Invalid response from Gemini: {}", e)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(self) -> Result<String> {
        let block_reason = self.prompt_feedback.and_then(|feedback| feedback.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(PrecisError::Unexpected(match block_reason {
                Some(reason) => format!("Gemini returned no candidates (prompt blocked: {reason})"),
                None => "Gemini returned no candidates".to_string(),
            }));
        };

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
            return Err(PrecisError::Unexpected(format!(
                "Gemini response contained no text (finish reason: {reason})"
            )));
        }

        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
    status: Option<String>,
}
