// HTTP client for the insights endpoint
use crate::application::insights_panel::InsightsSource;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

const GENERIC_FAILURE: &str = "Failed to generate insights";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx reply; the message is the server's `error` field.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Failed to send insights request: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Failed to parse insights response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ClientError {
    /// HTTP status of a non-2xx reply; `None` when no reply was read.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            ClientError::Transport(_) | ClientError::Decode(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InsightsReply {
    insights: String,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: String,
}

#[derive(Debug, Clone)]
pub struct InsightsClient {
    endpoint: String,
    http: reqwest::Client,
}

impl InsightsClient {
    /// `endpoint` is the full URL of `POST /api/generate-insights`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    /// One POST of `{ data }`; no retries.
    pub async fn fetch_insights(&self, data: &Value) -> Result<String, ClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "data": data }))
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorReply>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| GENERIC_FAILURE.to_string());
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let reply = response
            .json::<InsightsReply>()
            .await
            .map_err(ClientError::Decode)?;
        Ok(reply.insights)
    }
}

#[async_trait]
impl InsightsSource for InsightsClient {
    async fn fetch_insights(&self, data: &Value) -> anyhow::Result<String> {
        InsightsClient::fetch_insights(self, data).await.map_err(|err| {
            if let Some(status) = err.status() {
                tracing::warn!("Insights endpoint answered {}: {}", status, err);
            }
            err.into()
        })
    }
}
