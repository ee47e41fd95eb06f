// Application layer - Use cases and service orchestration
pub mod fallback;
pub mod insights_generator;
pub mod insights_panel;
pub mod insights_service;
pub mod prompt;
pub mod template;
