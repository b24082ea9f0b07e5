use crate::config::GeminiSettings;
use crate::core::Prompt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the Gemini API
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned status {status}")]
    ApiError { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<PartRef<'a>>,
}

#[derive(Debug, Serialize)]
struct PartRef<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if non-empty
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.is_empty())
    }
}

/// Gemini `generateContent` client
///
/// Issues exactly one request per call. There is no retry and no caching;
/// a timeout applies only when configured.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    generation: GenerationConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a new client; fails only if the HTTP client cannot be built
    pub fn new(settings: &GeminiSettings, api_key: &str) -> Result<Self, GeminiError> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            base_url: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: api_key.to_string(),
            generation: GenerationConfig {
                temperature: settings.temperature,
                max_output_tokens: settings.max_output_tokens,
            },
            client: builder.build()?,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(&self.api_key)
        )
    }

    /// Send the prompt and return the first candidate's text
    ///
    /// `Ok(None)` means the API answered successfully but produced no text.
    pub async fn generate(&self, prompt: &Prompt) -> Result<Option<String>, GeminiError> {
        let payload = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![PartRef { text: &prompt.system }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![PartRef { text: &prompt.user }],
            }],
            generation_config: self.generation,
        };

        tracing::debug!(
            "Calling Gemini model {} ({} prompt chars)",
            self.model,
            prompt.user.chars().count()
        );

        let response = self.client.post(self.url()).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(GeminiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&body)
            .map_err(|e| GeminiError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(parsed.first_text())
    }
}
