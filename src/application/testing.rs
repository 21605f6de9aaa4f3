// In-memory trends source shared by the application-layer tests
use crate::application::trends_source::{ProviderError, TrendsSource};
use crate::domain::query::{QueryParams, Timeframe};
use crate::domain::trend::{
    RankedQuery, RegionRow, RegionTable, RelatedQueries, Resolution, TrendRow, TrendTable,
};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn python_params() -> QueryParams {
    QueryParams::new(vec!["python".into()], "today 3-m".parse::<Timeframe>().unwrap(), "US").unwrap()
}

/// `days` daily rows starting 2024-01-01, values cycling through 0..100.
pub fn daily_table(keywords: &[&str], days: usize) -> TrendTable {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let rows = (0..days)
        .map(|d| {
            let values = (0..keywords.len())
                .map(|k| ((d * 7 + k * 13) % 101) as f64)
                .collect();
            TrendRow::new(start + Duration::days(d as i64), values, d + 1 == days)
        })
        .collect();
    TrendTable::new(keywords.iter().map(|k| k.to_string()).collect(), rows).unwrap()
}

pub fn region_table(keywords: &[String]) -> RegionTable {
    let rows = [("US", "United States", 100.0), ("IN", "India", 80.0), ("NG", "Nigeria", 35.0), ("DE", "Germany", 10.0)]
        .into_iter()
        .map(|(code, name, score)| RegionRow {
            geo_code: code.into(),
            geo_name: name.into(),
            values: vec![score; keywords.len()],
        })
        .collect();
    RegionTable::new(Resolution::Country, keywords.to_vec(), rows).unwrap()
}

#[derive(Default)]
pub struct FakeSource {
    days: usize,
    table: Option<TrendTable>,
    rate_limited: bool,
    regions_fail: bool,
    related_fail: bool,
    /// Per first-keyword artificial latency
    delays_ms: HashMap<String, u64>,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_days(mut self, days: usize) -> Self {
        self.days = days;
        self
    }

    pub fn with_table(mut self, table: TrendTable) -> Self {
        self.table = Some(table);
        self
    }

    pub fn rate_limited(mut self) -> Self {
        self.rate_limited = true;
        self
    }

    pub fn failing_regions(mut self) -> Self {
        self.regions_fail = true;
        self
    }

    pub fn failing_related(mut self) -> Self {
        self.related_fail = true;
        self
    }

    pub fn with_delay(mut self, keyword: &str, ms: u64) -> Self {
        self.delays_ms.insert(keyword.to_string(), ms);
        self
    }
}

#[async_trait]
impl TrendsSource for FakeSource {
    async fn interest_over_time(&self, params: &QueryParams) -> Result<TrendTable, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ms) = self.delays_ms.get(params.first_keyword()) {
            tokio::time::sleep(std::time::Duration::from_millis(*ms)).await;
        }
        if self.rate_limited {
            return Err(ProviderError::RateLimited);
        }
        if let Some(table) = &self.table {
            return Ok(table.clone());
        }
        let keywords: Vec<&str> = params.keywords().iter().map(String::as_str).collect();
        Ok(daily_table(&keywords, self.days))
    }

    async fn interest_by_region(
        &self,
        params: &QueryParams,
        _resolution: Resolution,
    ) -> Result<RegionTable, ProviderError> {
        if self.regions_fail {
            return Err(ProviderError::MissingWidget("GEO_MAP"));
        }
        Ok(region_table(params.keywords()))
    }

    async fn related_queries(&self, params: &QueryParams) -> Result<RelatedQueries, ProviderError> {
        if self.related_fail {
            return Err(ProviderError::Malformed("truncated".into()));
        }
        Ok(RelatedQueries {
            keyword: params.first_keyword().to_string(),
            top: Some(vec![RankedQuery {
                query: format!("{} tutorial", params.first_keyword()),
                value: 100.0,
                formatted_value: "100".into(),
            }]),
            rising: None,
        })
    }
}
