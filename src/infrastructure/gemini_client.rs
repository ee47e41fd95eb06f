// Gemini generateContent client
use crate::application::insights_generator::{GenerationError, InsightsGenerator};
use crate::infrastructure::config::GeminiSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
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
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key().map(str::to_string),
            timeout: settings.timeout(),
            http,
        })
    }

    /// The credential, or the configuration error before any I/O happens.
    fn api_key(&self) -> Result<&str, GenerationError> {
        self.api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredential)
    }

    fn build_url(&self, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(api_key)
        )
    }

    async fn generate_content(&self, api_key: &str, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.build_url(api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(api_error(status, &text));
        }

        let data = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| GenerationError::Remote(format!("Failed to parse Gemini response: {}", e)))?;

        let text: String = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::Remote(
                "Gemini returned an empty response".to_string(),
            ));
        }

        Ok(text)
    }

    fn transport_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Remote(format!("Failed to send request to Gemini: {}", e))
        }
    }
}

/// Map a non-2xx reply; HTTP 429 and `RESOURCE_EXHAUSTED` are rate limits.
fn api_error(status: reqwest::StatusCode, body: &str) -> GenerationError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let message = if envelope.error.message.is_empty() {
                format!("Gemini request failed with status {}", status)
            } else {
                envelope.error.message
            };
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS
                || envelope.error.status == "RESOURCE_EXHAUSTED"
            {
                GenerationError::RateLimited(message)
            } else {
                GenerationError::Remote(message)
            }
        }
        Err(_) if status == reqwest::StatusCode::TOO_MANY_REQUESTS => {
            GenerationError::RateLimited(format!("Gemini request failed with status {}", status))
        }
        Err(_) => GenerationError::Remote(format!(
            "Gemini request failed with status {}: {}",
            status, body
        )),
    }
}

#[async_trait]
impl InsightsGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key()?;
        tracing::debug!("Calling Gemini model {}", self.model);
        self.generate_content(api_key, prompt).await
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
