use serde::{Deserialize, Serialize};

use super::AnalysisError;
use crate::config;

/// Preferred vision models in order of preference.
const VISION_MODELS: &[&str] = &["llava", "llava:13b", "llava:7b", "llava:latest"];

/// The external analysis capability: one opaque call that takes the
/// comparison prompt and returns unstructured text expected to contain
/// JSON. No retry happens at this seam.
pub trait AnalysisClient {
    fn analyze(&self, model: &str, prompt: &str, system: &str) -> Result<String, AnalysisError>;
    fn is_model_available(&self, model: &str) -> Result<bool, AnalysisError>;
    fn list_models(&self) -> Result<Vec<String>, AnalysisError>;
}

/// Ollama HTTP client for local vision-LLM inference.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new OllamaClient pointing at a local Ollama instance.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default local instance with the configured timeout.
    pub fn default_local() -> Self {
        Self::new(
            config::DEFAULT_ANALYSIS_URL,
            config::DEFAULT_ANALYSIS_TIMEOUT_SECS,
        )
    }

    /// Find the best available vision model.
    pub fn find_best_model(&self) -> Result<String, AnalysisError> {
        let available = self.list_models()?;
        for preferred in VISION_MODELS {
            if available.iter().any(|m| m.starts_with(preferred)) {
                return Ok(preferred.to_string());
            }
        }
        Err(AnalysisError::NoModelAvailable)
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<TaggedModel>,
}

#[derive(Deserialize)]
struct TaggedModel {
    name: String,
}

impl AnalysisClient for OllamaClient {
    fn analyze(&self, model: &str, prompt: &str, system: &str) -> Result<String, AnalysisError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model,
            prompt,
            system,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                AnalysisError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                AnalysisError::HttpClient(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                AnalysisError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        Ok(parsed.response)
    }

    fn is_model_available(&self, model: &str) -> Result<bool, AnalysisError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, AnalysisError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() {
                AnalysisError::Connection(self.base_url.clone())
            } else {
                AnalysisError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TagsResponse = response
            .json()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Mock analysis client for testing — returns queued responses in order
/// and counts how many analysis calls were made.
pub struct MockAnalysisClient {
    responses: Vec<Result<String, String>>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockAnalysisClient {
    pub fn new(response: &str) -> Self {
        Self::with_responses(vec![Ok(response.to_string())])
    }

    /// Queue one result per expected call; the last entry repeats if the
    /// queue runs out. `Err` entries simulate a failed service call.
    pub fn with_responses(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl AnalysisClient for MockAnalysisClient {
    fn analyze(&self, _model: &str, _prompt: &str, _system: &str) -> Result<String, AnalysisError> {
        let index = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let slot = index.min(self.responses.len().saturating_sub(1));
        match &self.responses[slot] {
            Ok(text) => Ok(text.clone()),
            Err(body) => Err(AnalysisError::Service {
                status: 500,
                body: body.clone(),
            }),
        }
    }

    fn is_model_available(&self, _model: &str) -> Result<bool, AnalysisError> {
        Ok(true)
    }

    fn list_models(&self) -> Result<Vec<String>, AnalysisError> {
        Ok(vec!["llava:latest".to_string()])
    }
}
