// Application layer - Use cases and the provider seam
pub mod chart_builder;
pub mod dashboard_app;
pub mod trend_data_provider;
pub mod trends_source;

#[cfg(test)]
pub mod testing;
