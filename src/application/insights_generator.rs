// Generator trait for the remote generative-AI service
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Marker carried by the missing-credential error so untyped failures can
/// still be recognised as configuration problems.
pub const CONFIGURATION_MARKER: &str = "API key not configured";

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("GEMINI_API_KEY is missing: API key not configured")]
    MissingCredential,
    #[error("{0}")]
    RateLimited(String),
    #[error("AI service did not respond within {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("{0}")]
    Remote(String),
}

#[async_trait]
pub trait InsightsGenerator: Send + Sync {
    /// Run one completion for `prompt`. No retries, no streaming.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Whether a credential is available; used by the health endpoint.
    fn is_configured(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_carries_marker() {
        assert!(GenerationError::MissingCredential
            .to_string()
            .contains(CONFIGURATION_MARKER));
    }

    #[test]
    fn test_timeout_message() {
        let err = GenerationError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "AI service did not respond within 30s");
    }
}
