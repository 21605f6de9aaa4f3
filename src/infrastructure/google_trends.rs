// Google Trends source implementation
use crate::application::trends_source::{ProviderError, TrendsSource};
use crate::domain::query::QueryParams;
use crate::domain::trend::{
    RankedQuery, RegionRow, RegionTable, RelatedQueries, Resolution, TrendRow, TrendTable,
};
use crate::infrastructure::config::ProviderSettings;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::OnceCell;

const USER_AGENT: &str = "trends-dashboard/0.1";
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Debug)]
pub struct GoogleTrendsSource {
    http: reqwest::Client,
    base_url: String,
    hl: String,
    tz: i32,
    related_pause: Duration,
    cookies: OnceCell<()>,
}

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Clone, Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    request: Value,
}

#[derive(Debug, Deserialize)]
struct WidgetResponse<T> {
    default: T,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(default, rename = "timelineData")]
    points: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    /// Unix seconds, as a string
    time: String,
    value: Vec<f64>,
    #[serde(default, rename = "isPartial")]
    is_partial: bool,
}

#[derive(Debug, Deserialize)]
struct GeoMap {
    #[serde(default, rename = "geoMapData")]
    regions: Vec<GeoPoint>,
}

#[derive(Debug, Deserialize)]
struct GeoPoint {
    #[serde(default, rename = "geoCode")]
    geo_code: String,
    #[serde(rename = "geoName")]
    geo_name: String,
    value: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RankedLists {
    #[serde(default, rename = "rankedList")]
    lists: Vec<RankedList>,
}

#[derive(Debug, Deserialize)]
struct RankedList {
    #[serde(default, rename = "rankedKeyword")]
    keywords: Vec<RankedKeyword>,
}

#[derive(Debug, Deserialize)]
struct RankedKeyword {
    query: String,
    #[serde(default)]
    value: f64,
    #[serde(default, rename = "formattedValue")]
    formatted_value: String,
}

impl GoogleTrendsSource {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true);
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            hl: settings.hl.clone(),
            tz: settings.tz,
            related_pause: Duration::from_millis(settings.related_pause_ms),
            cookies: OnceCell::new(),
        })
    }

    fn explore_url(&self, params: &QueryParams) -> String {
        let time = params.timeframe().as_provider_string();
        let items: Vec<Value> = params
            .keywords()
            .iter()
            .map(|k| json!({ "keyword": k, "time": time, "geo": params.geo() }))
            .collect();
        let req = json!({ "comparisonItem": items, "category": 0, "property": "" });

        format!(
            "{}/trends/api/explore?hl={}&tz={}&req={}",
            self.base_url,
            urlencoding::encode(&self.hl),
            self.tz,
            urlencoding::encode(&req.to_string())
        )
    }

    fn widget_url(&self, endpoint: &str, request: &Value, token: &str) -> String {
        format!(
            "{}/trends/api/widgetdata/{}?hl={}&tz={}&req={}&token={}",
            self.base_url,
            endpoint,
            urlencoding::encode(&self.hl),
            self.tz,
            urlencoding::encode(&request.to_string()),
            urlencoding::encode(token)
        )
    }

    /// The provider hands out a session cookie on its landing page and
    /// answers 429 to API calls made without it.
    async fn ensure_cookies(&self) {
        self.cookies
            .get_or_init(|| async {
                let region = self.hl.rsplit('-').next().unwrap_or("US");
                let url = format!("{}/?geo={}", self.base_url, urlencoding::encode(region));
                match self.http.get(&url).send().await {
                    Ok(response) => tracing::debug!("Cookie bootstrap returned {}", response.status()),
                    Err(e) => tracing::warn!("Cookie bootstrap failed: {}", e),
                }
            })
            .await;
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ProviderError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        Ok(response.text().await?)
    }

    async fn explore(&self, params: &QueryParams) -> Result<Vec<Widget>, ProviderError> {
        self.ensure_cookies().await;
        let url = self.explore_url(params);
        tracing::debug!("Exploring {:?}", params.keywords());

        let body = self.send(self.http.post(&url)).await?;
        let explore: ExploreResponse = parse_guarded(&body)?;
        Ok(explore.widgets)
    }

    async fn widget_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: &Value,
        token: &str,
    ) -> Result<T, ProviderError> {
        let url = self.widget_url(endpoint, request, token);
        let body = self.send(self.http.get(&url)).await?;
        let response: WidgetResponse<T> = parse_guarded(&body)?;
        Ok(response.default)
    }
}

#[async_trait]
impl TrendsSource for GoogleTrendsSource {
    async fn interest_over_time(&self, params: &QueryParams) -> Result<TrendTable, ProviderError> {
        let widgets = self.explore(params).await?;
        let widget = find_widget(&widgets, "TIMESERIES").ok_or(ProviderError::MissingWidget("TIMESERIES"))?;

        let timeline: Timeline = self.widget_data("multiline", &widget.request, &widget.token).await?;
        timeline_to_table(timeline, params.keywords())
    }

    async fn interest_by_region(
        &self,
        params: &QueryParams,
        resolution: Resolution,
    ) -> Result<RegionTable, ProviderError> {
        let widgets = self.explore(params).await?;
        let widget = find_widget(&widgets, "GEO_MAP").ok_or(ProviderError::MissingWidget("GEO_MAP"))?;

        let (request, resolution) = geo_request(&widget.request, params.geo(), resolution);
        tracing::debug!("Regional breakdown at {} level", resolution.as_str());
        let geo: GeoMap = self.widget_data("comparedgeo", &request, &widget.token).await?;
        geo_to_table(geo, resolution, params.keywords())
    }

    async fn related_queries(&self, params: &QueryParams) -> Result<RelatedQueries, ProviderError> {
        let widgets = self.explore(params).await?;
        let widget = related_widget(&widgets, params.first_keyword())
            .ok_or(ProviderError::MissingWidget("RELATED_QUERIES"))?;

        tokio::time::sleep(self.related_pause).await;
        let ranked: RankedLists = self
            .widget_data("relatedsearches", &widget.request, &widget.token)
            .await?;
        Ok(ranked_to_related(ranked, params.first_keyword()))
    }
}

/// Bodies start with an anti-JSON-hijacking guard such as `)]}'` or `)]}',`.
fn parse_guarded<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    let start = body
        .find('{')
        .ok_or_else(|| ProviderError::Malformed("response carries no JSON object".to_string()))?;
    Ok(serde_json::from_str(&body[start..])?)
}

fn find_widget<'a>(widgets: &'a [Widget], id: &str) -> Option<&'a Widget> {
    widgets.iter().find(|w| w.id == id)
}

/// One related-queries widget is offered per keyword.
fn related_widget<'a>(widgets: &'a [Widget], keyword: &str) -> Option<&'a Widget> {
    let related: Vec<&Widget> = widgets
        .iter()
        .filter(|w| w.id.contains("RELATED_QUERIES"))
        .collect();

    related
        .iter()
        .find(|w| {
            w.request
                .pointer("/restriction/complexKeywordsRestriction/keyword/0/value")
                .and_then(Value::as_str)
                == Some(keyword)
        })
        .or_else(|| related.first())
        .copied()
}

/// The requested resolution only applies worldwide, or to sub-country
/// levels of the US. Any other country keeps the widget's own resolution,
/// which breaks down by its sub-regions. Returns the resolution actually sent.
fn geo_request(request: &Value, geo: &str, resolution: Resolution) -> (Value, Resolution) {
    let overridden = geo.is_empty() || (geo == "US" && resolution != Resolution::Country);
    let effective = if overridden {
        resolution
    } else {
        request
            .get("resolution")
            .and_then(|r| Resolution::deserialize(r).ok())
            .unwrap_or(Resolution::Region)
    };

    let mut request = request.clone();
    if let Some(fields) = request.as_object_mut() {
        if overridden {
            fields.insert("resolution".to_string(), json!(effective.as_str()));
        }
        fields.insert("includeLowSearchVolumeGeos".to_string(), json!(false));
    }
    (request, effective)
}

fn timeline_to_table(timeline: Timeline, keywords: &[String]) -> Result<TrendTable, ProviderError> {
    let rows = timeline
        .points
        .into_iter()
        .map(|p| {
            let secs: i64 = p
                .time
                .parse()
                .map_err(|_| ProviderError::Malformed(format!("bad timestamp {:?}", p.time)))?;
            let timestamp = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| ProviderError::Malformed(format!("timestamp out of range: {}", secs)))?;
            Ok::<_, ProviderError>(TrendRow::new(timestamp, p.value, p.is_partial))
        })
        .collect::<Result<Vec<_>, _>>()?;

    TrendTable::new(keywords.to_vec(), rows).map_err(|e| ProviderError::Malformed(e.to_string()))
}

fn geo_to_table(geo: GeoMap, resolution: Resolution, keywords: &[String]) -> Result<RegionTable, ProviderError> {
    let rows = geo
        .regions
        .into_iter()
        .map(|g| RegionRow {
            geo_code: g.geo_code,
            geo_name: g.geo_name,
            values: g.value,
        })
        .collect();

    RegionTable::new(resolution, keywords.to_vec(), rows).map_err(|e| ProviderError::Malformed(e.to_string()))
}

fn ranked_to_related(ranked: RankedLists, keyword: &str) -> RelatedQueries {
    let mut lists = ranked.lists.into_iter().map(|list| {
        let queries: Vec<RankedQuery> = list
            .keywords
            .into_iter()
            .map(|k| RankedQuery {
                query: k.query,
                value: k.value,
                formatted_value: k.formatted_value,
            })
            .collect();
        (!queries.is_empty()).then_some(queries)
    });

    RelatedQueries {
        keyword: keyword.to_string(),
        top: lists.next().flatten(),
        rising: lists.next().flatten(),
    }
}
