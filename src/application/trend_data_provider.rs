// Trend data provider - Use case for fetching a normalized trend table
use crate::application::trends_source::{ProviderError, TrendsSource};
use crate::domain::query::QueryParams;
use crate::domain::trend::{RelatedQueries, Resolution, TrendTable};
use std::sync::Arc;

#[derive(Clone)]
pub struct TrendDataProvider {
    source: Arc<dyn TrendsSource>,
    resolution: Resolution,
}

impl TrendDataProvider {
    pub fn new(source: Arc<dyn TrendsSource>, resolution: Resolution) -> Self {
        Self { source, resolution }
    }

    /// Fetch interest over time and, best-effort, the regional breakdown.
    ///
    /// The returned table always has exactly `params.keywords` as columns and
    /// at least one row.
    pub async fn fetch(&self, params: &QueryParams) -> Result<TrendTable, ProviderError> {
        tracing::debug!(
            "Fetching interest over time for {:?} ({}, geo={:?})",
            params.keywords(),
            params.timeframe(),
            params.geo()
        );

        let table = self.source.interest_over_time(params).await?;
        if table.keywords() != params.keywords() {
            return Err(ProviderError::Malformed(format!(
                "expected columns {:?}, got {:?}",
                params.keywords(),
                table.keywords()
            )));
        }
        if table.is_empty() {
            return Err(ProviderError::NoData);
        }

        match self.source.interest_by_region(params, self.resolution).await {
            Ok(regions) if !regions.is_empty() => Ok(table.with_regions(regions)),
            Ok(_) => {
                tracing::debug!("No regional breakdown for {:?}", params.keywords());
                Ok(table)
            }
            Err(e) => {
                tracing::warn!("Regional breakdown unavailable: {}", e);
                Ok(table)
            }
        }
    }

    /// Related searches for the first keyword; empty when the provider has none.
    pub async fn related(&self, params: &QueryParams) -> RelatedQueries {
        match self.source.related_queries(params).await {
            Ok(related) => related,
            Err(e) => {
                tracing::warn!("Related queries unavailable: {}", e);
                RelatedQueries {
                    keyword: params.first_keyword().to_string(),
                    ..RelatedQueries::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FakeSource, daily_table, python_params};
    use crate::domain::query::Timeframe;

    #[tokio::test]
    async fn test_fetch_returns_one_column_per_keyword() {
        let source = FakeSource::default().with_days(90);
        let provider = TrendDataProvider::new(Arc::new(source), Resolution::Country);

        let table = provider.fetch(&python_params()).await.unwrap();

        assert_eq!(table.keywords(), ["python".to_string()]);
        assert_eq!(table.len(), 90);
        let stamps = table.timestamps();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        assert!(table.regions().is_some());
    }

    #[tokio::test]
    async fn test_fetch_keeps_table_when_regions_fail() {
        let source = FakeSource::default().with_days(30).failing_regions();
        let provider = TrendDataProvider::new(Arc::new(source), Resolution::Country);

        let table = provider.fetch(&python_params()).await.unwrap();
        assert_eq!(table.len(), 30);
        assert!(table.regions().is_none());
    }

    #[tokio::test]
    async fn test_fetch_empty_is_no_data() {
        let source = FakeSource::default().with_days(0);
        let provider = TrendDataProvider::new(Arc::new(source), Resolution::Country);

        let err = provider.fetch(&python_params()).await.unwrap_err();
        assert!(matches!(err, ProviderError::NoData));
    }

    #[tokio::test]
    async fn test_fetch_rejects_mismatched_columns() {
        let source = FakeSource::default().with_table(daily_table(&["java"], 5));
        let provider = TrendDataProvider::new(Arc::new(source), Resolution::Country);

        let err = provider.fetch(&python_params()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_fetch_surfaces_rate_limit() {
        let source = FakeSource::default().rate_limited();
        let provider = TrendDataProvider::new(Arc::new(source), Resolution::Country);

        let err = provider.fetch(&python_params()).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited));
    }

    #[tokio::test]
    async fn test_related_falls_back_to_empty() {
        let source = FakeSource::default().failing_related();
        let provider = TrendDataProvider::new(Arc::new(source), Resolution::Country);
        let params = QueryParams::new(vec!["rust".into(), "go".into()], Timeframe::default(), "").unwrap();

        let related = provider.related(&params).await;
        assert_eq!(related.keyword, "rust");
        assert!(related.top.is_none());
        assert!(related.rising.is_none());
    }
}
