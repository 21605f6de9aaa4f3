// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_export;
pub mod google_trends;
pub mod http_response;
