// Insights panel - live insights with an offline fallback
use crate::application::fallback::generate_fallback_insights;
use crate::domain::snapshot::DashboardSnapshot;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Where the panel fetches live insights from (the insights endpoint).
#[async_trait]
pub trait InsightsSource: Send + Sync {
    /// Returns the insights HTML, or an error whose message is the server's
    /// `error` field.
    async fn fetch_insights(&self, data: &Value) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflineNotice {
    RateLimited,
    Configuration,
    Unavailable,
}

impl OfflineNotice {
    /// Pick a notice from the error text returned by the endpoint.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("rate limit") {
            Self::RateLimited
        } else if lower.contains("configuration") {
            Self::Configuration
        } else {
            Self::Unavailable
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::RateLimited => {
                "AI service is busy right now. Showing offline insights; try again in a few minutes."
            }
            Self::Configuration => {
                "AI service is not configured. Showing offline insights generated from your data."
            }
            Self::Unavailable => "AI service is unavailable. Showing offline insights.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsightsMode {
    Live,
    Offline(OfflineNotice),
}

#[derive(Debug, Clone)]
pub struct PanelInsights {
    pub html: String,
    pub mode: InsightsMode,
}

#[derive(Clone)]
pub struct InsightsPanel {
    source: Arc<dyn InsightsSource>,
}

impl InsightsPanel {
    pub fn new(source: Arc<dyn InsightsSource>) -> Self {
        Self { source }
    }

    /// Never fails: any error from the source switches to offline mode.
    pub async fn load(&self, snapshot: &DashboardSnapshot) -> PanelInsights {
        match self.source.fetch_insights(snapshot.as_value()).await {
            Ok(html) => PanelInsights {
                html,
                mode: InsightsMode::Live,
            },
            Err(e) => {
                let notice = OfflineNotice::from_message(&e.to_string());
                tracing::info!("Using offline insights ({:?}): {}", notice, e);
                PanelInsights {
                    html: generate_fallback_insights(snapshot),
                    mode: InsightsMode::Offline(notice),
                }
            }
        }
    }
}
