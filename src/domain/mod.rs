// Domain layer - Core types of the trends dashboard
pub mod chart;
pub mod dashboard;
pub mod geo;
pub mod query;
pub mod trend;
