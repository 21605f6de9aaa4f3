// Presentation layer - HTTP surface and the dashboard page
pub mod app_state;
pub mod error;
pub mod handlers;
