// HTTP request handlers
use crate::domain::dashboard::{DEFAULT_TOP_N, DashboardInput, RegionFilter, TOP_N_RANGE};
use crate::domain::query::{DEFAULT_TIMEFRAME, MAX_KEYWORDS, TIMEFRAME_PRESETS};
use crate::infrastructure::csv_export::{CSV_FILENAME, interest_csv};
use crate::infrastructure::http_response::{accepts_brotli, attachment_response, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::AppError;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

#[derive(Serialize)]
pub struct TimeframeOption {
    pub label: &'static str,
    pub value: &'static str,
}

#[derive(Serialize)]
pub struct DashboardOptions {
    pub timeframes: Vec<TimeframeOption>,
    pub default_timeframe: &'static str,
    pub max_keywords: usize,
    pub top_n: [usize; 3],
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// The dashboard page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Values for the input controls
pub async fn options(headers: HeaderMap) -> Response {
    let options = DashboardOptions {
        timeframes: TIMEFRAME_PRESETS
            .iter()
            .map(|&(value, label)| TimeframeOption { label, value })
            .collect(),
        default_timeframe: DEFAULT_TIMEFRAME,
        max_keywords: MAX_KEYWORDS,
        top_n: [TOP_N_RANGE.0, DEFAULT_TOP_N, TOP_N_RANGE.1],
    };
    respond(&options, StatusCode::OK, &headers).await
}

/// What is currently on screen
pub async fn current_view(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let view = state.dashboard.current_view().await;
    respond(&view, StatusCode::OK, &headers).await
}

/// Input controls changed: run the pipeline
pub async fn analyze(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(input): Json<DashboardInput>,
) -> Result<Response, AppError> {
    let view = state.dashboard.on_input(input).await?;
    Ok(respond(&view, StatusCode::OK, &headers).await)
}

/// Region sliders moved: re-filter without fetching
pub async fn filter_regions(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(filter): Json<RegionFilter>,
) -> Result<Response, AppError> {
    let view = state.dashboard.apply_region_filter(filter).await?;
    Ok(respond(&view, StatusCode::OK, &headers).await)
}

/// Displayed time series as CSV
pub async fn download_csv(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let table = state.dashboard.displayed_table().await?;
    let bytes = interest_csv(&table)?;
    tracing::info!("Exporting {} rows for {:?}", table.len(), table.keywords());

    Ok(match attachment_response(bytes, "text/csv; charset=utf-8", CSV_FILENAME) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    })
}

async fn respond<T: Serialize>(data: &T, status: StatusCode, headers: &HeaderMap) -> Response {
    match json_response(data, status, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_builder::ChartBuilder;
    use crate::application::dashboard_app::DashboardApp;
    use crate::application::testing::FakeSource;
    use crate::application::trend_data_provider::TrendDataProvider;
    use crate::domain::trend::Resolution;

    fn state() -> Arc<AppState> {
        let source = Arc::new(FakeSource::default().with_days(12));
        let provider = TrendDataProvider::new(source, Resolution::Country);
        Arc::new(AppState {
            dashboard: DashboardApp::new(provider, ChartBuilder::default()),
        })
    }

    #[tokio::test]
    async fn test_download_before_analysis_is_not_found() {
        let response = download_csv(State(state())).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_analyze_then_download() {
        let state = state();
        let input = DashboardInput {
            keywords: "rust, go".to_string(),
            ..DashboardInput::default()
        };

        let response = analyze(HeaderMap::new(), State(state.clone()), Json(input))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response = download_csv(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/csv; charset=utf-8");
    }

    #[tokio::test]
    async fn test_index_serves_page() {
        let Html(page) = index().await;
        assert!(page.contains("Google Trends Explorer"));
        assert!(page.contains("/api/analyze"));
    }
}
