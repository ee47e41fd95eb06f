// Presentation layer - HTTP and function hosting adapters
pub mod app_state;
pub mod endpoint;
pub mod function_adapter;
pub mod handlers;
