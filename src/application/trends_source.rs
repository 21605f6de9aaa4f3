// Source trait for search-interest data access
use crate::domain::query::QueryParams;
use crate::domain::trend::{RegionTable, RelatedQueries, Resolution, TrendTable};
use async_trait::async_trait;
use thiserror::Error;

/// Failures talking to the trends provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection, TLS or body read failure
    #[error("trends provider unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// HTTP 429 from the provider
    #[error("rate limited by the trends provider, try again in a minute")]
    RateLimited,

    #[error("trends provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed trends response: {0}")]
    Malformed(String),

    /// Explore response lacked the widget a data call needs
    #[error("trends provider did not offer a {0} widget")]
    MissingWidget(&'static str),

    #[error("No trend data returned. Try a longer timeframe (e.g., 'today 12-m') or different keywords.")]
    NoData,
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Malformed(e.to_string())
    }
}

#[async_trait]
pub trait TrendsSource: Send + Sync {
    /// Interest over time, one column per keyword
    async fn interest_over_time(&self, params: &QueryParams) -> Result<TrendTable, ProviderError>;

    /// Interest broken down by geography at the given resolution
    async fn interest_by_region(
        &self,
        params: &QueryParams,
        resolution: Resolution,
    ) -> Result<RegionTable, ProviderError>;

    /// Top and rising related searches for the first keyword
    async fn related_queries(&self, params: &QueryParams) -> Result<RelatedQueries, ProviderError>;
}
