// Insight domain models
use chrono::{DateTime, SecondsFormat, Utc};

/// HTML produced by the remote model, stamped with the time it was received.
#[derive(Debug, Clone)]
pub struct GeneratedInsights {
    pub html: String,
    pub timestamp: DateTime<Utc>,
}

impl GeneratedInsights {
    pub fn new(html: String) -> Self {
        Self {
            html,
            timestamp: Utc::now(),
        }
    }

    /// ISO-8601 with millisecond precision and a `Z` suffix.
    pub fn timestamp_iso(&self) -> String {
        iso_timestamp(self.timestamp)
    }
}

pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
