// Insights service - Use case for generating insights through the remote model
use crate::application::insights_generator::{
    GenerationError, InsightsGenerator, CONFIGURATION_MARKER,
};
use crate::application::prompt::build_prompt;
use crate::domain::insights::GeneratedInsights;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Every failure the insights endpoint can answer with.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InsightsError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Dashboard data is required")]
    MissingData,
    #[error("AI service configuration error")]
    Configuration,
    #[error("AI service rate limit exceeded")]
    RateLimited,
    #[error("Failed to generate insights")]
    Unknown(Option<String>),
}

impl InsightsError {
    pub fn details(&self) -> Option<String> {
        match self {
            Self::MethodNotAllowed | Self::MissingData => None,
            Self::Configuration => Some("API key not configured".to_string()),
            Self::RateLimited => Some("Please try again later".to_string()),
            Self::Unknown(message) => Some(
                message
                    .clone()
                    .unwrap_or_else(|| "Unknown error occurred".to_string()),
            ),
        }
    }
}

impl From<GenerationError> for InsightsError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingCredential => Self::Configuration,
            GenerationError::RateLimited(_) => Self::RateLimited,
            GenerationError::Timeout(after) => {
                Self::Unknown(Some(GenerationError::Timeout(after).to_string()))
            }
            // Untyped failures: fall back to matching the message text.
            GenerationError::Remote(message) => {
                if message.contains(CONFIGURATION_MARKER) {
                    Self::Configuration
                } else if message.contains("quota") || message.contains("limit") {
                    Self::RateLimited
                } else if message.trim().is_empty() {
                    Self::Unknown(None)
                } else {
                    Self::Unknown(Some(message))
                }
            }
        }
    }
}

#[derive(Clone)]
pub struct InsightsService {
    generator: Arc<dyn InsightsGenerator>,
    timeout: Duration,
}

impl InsightsService {
    pub fn new(generator: Arc<dyn InsightsGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_configured()
    }

    /// One remote completion for `data`, bounded by the configured timeout.
    pub async fn generate_insights(&self, data: &Value) -> Result<GeneratedInsights, InsightsError> {
        let prompt = build_prompt(data);

        let outcome = match tokio::time::timeout(self.timeout, self.generator.generate(&prompt)).await
        {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(html) => {
                tracing::debug!("Generated {} bytes of insights", html.len());
                Ok(GeneratedInsights::new(html))
            }
            Err(err) => {
                let classified = InsightsError::from(err.clone());
                match &classified {
                    InsightsError::Configuration | InsightsError::RateLimited => {
                        tracing::warn!("Insights generation failed ({}): {}", classified, err)
                    }
                    _ => tracing::error!("Insights generation failed: {}", err),
                }
                Err(classified)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted generator: returns canned results and records prompts.
    pub(crate) struct MockGenerator {
        pub configured: bool,
        pub reply: Mutex<Option<Result<String, GenerationError>>>,
        pub delay: Option<Duration>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl MockGenerator {
        pub(crate) fn replying(reply: Result<String, GenerationError>) -> Self {
            Self {
                configured: true,
                reply: Mutex::new(Some(reply)),
                delay: None,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InsightsGenerator for MockGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(GenerationError::Remote("no scripted reply".to_string())))
        }

        fn is_configured(&self) -> bool {
            self.configured
        }
    }

    fn service(generator: MockGenerator) -> InsightsService {
        InsightsService::new(Arc::new(generator), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_success_returns_generated_html() {
        let generator = Arc::new(MockGenerator::replying(Ok("<p>insight</p>".to_string())));
        let svc = InsightsService::new(generator.clone(), Duration::from_secs(5));

        let insights = svc.generate_insights(&json!({ "metrics": [] })).await.unwrap();
        assert_eq!(insights.html, "<p>insight</p>");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("\"metrics\": []"));
    }

    #[tokio::test]
    async fn test_missing_credential_is_configuration_error() {
        let svc = service(MockGenerator::replying(Err(GenerationError::MissingCredential)));
        let err = svc.generate_insights(&json!({})).await.unwrap_err();
        assert_eq!(err, InsightsError::Configuration);
        assert_eq!(err.details().as_deref(), Some("API key not configured"));
    }

    #[tokio::test]
    async fn test_quota_message_is_rate_limit() {
        let svc = service(MockGenerator::replying(Err(GenerationError::Remote(
            "Resource has been exhausted (e.g. check quota).".to_string(),
        ))));
        let err = svc.generate_insights(&json!({})).await.unwrap_err();
        assert_eq!(err, InsightsError::RateLimited);
        assert_eq!(err.details().as_deref(), Some("Please try again later"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_unknown_error() {
        let mut generator = MockGenerator::replying(Ok("late".to_string()));
        generator.delay = Some(Duration::from_secs(60));
        let svc = InsightsService::new(Arc::new(generator), Duration::from_secs(2));

        let err = svc.generate_insights(&json!({})).await.unwrap_err();
        assert_eq!(
            err,
            InsightsError::Unknown(Some("AI service did not respond within 2s".to_string()))
        );
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            InsightsError::from(GenerationError::RateLimited("slow down".to_string())),
            InsightsError::RateLimited
        );
        assert_eq!(
            InsightsError::from(GenerationError::Remote("rate limit hit".to_string())),
            InsightsError::RateLimited
        );
        // Case-sensitive match.
        assert_eq!(
            InsightsError::from(GenerationError::Remote("QUOTA".to_string())),
            InsightsError::Unknown(Some("QUOTA".to_string()))
        );
        assert_eq!(
            InsightsError::from(GenerationError::Remote("boom: API key not configured".to_string())),
            InsightsError::Configuration
        );
        assert_eq!(
            InsightsError::from(GenerationError::Remote(String::new())),
            InsightsError::Unknown(None)
        );
        assert_eq!(
            InsightsError::Unknown(None).details().as_deref(),
            Some("Unknown error occurred")
        );
    }
}
