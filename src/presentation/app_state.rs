// Application state for HTTP handlers
use crate::application::insights_service::InsightsService;

/// Snapshots are embedded whole in the request body, so allow well past
/// axum's 2 MB default.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub insights_service: InsightsService,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(insights_service: InsightsService) -> Self {
        Self {
            insights_service,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
