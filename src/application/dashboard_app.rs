// Dashboard app - Input handlers driving fetch -> build -> display
use crate::application::chart_builder::{ChartBuilder, ChartError};
use crate::application::trend_data_provider::TrendDataProvider;
use crate::domain::chart::{ChartKind, ChartSpec};
use crate::domain::dashboard::{Alert, DashboardInput, DashboardPhase, DashboardView, RegionFilter};
use crate::domain::geo::{country_code, country_name};
use crate::domain::query::{MAX_KEYWORDS, QueryError, QueryParams, Timeframe, parse_keywords};
use crate::domain::trend::TrendTable;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, watch};

#[derive(Debug, Error, PartialEq)]
pub enum DashboardError {
    /// A newer input arrived before this one finished
    #[error("request {0} was superseded by a newer one")]
    Superseded(u64),

    #[error("no trend data is displayed")]
    NothingDisplayed,
}

/// Owns the current query and the charts on screen (both live in the view).
///
/// Every input bumps a request counter. A run still in flight when the counter
/// moves on is dropped, and a run never writes its result once superseded, so
/// the screen always ends up showing the latest input.
#[derive(Clone)]
pub struct DashboardApp {
    provider: TrendDataProvider,
    charts: ChartBuilder,
    view: Arc<Mutex<DashboardView>>,
    latest: Arc<watch::Sender<u64>>,
}

impl DashboardApp {
    pub fn new(provider: TrendDataProvider, charts: ChartBuilder) -> Self {
        let (latest, _) = watch::channel(0);
        Self {
            provider,
            charts,
            view: Arc::new(Mutex::new(DashboardView::default())),
            latest: Arc::new(latest),
        }
    }

    pub async fn current_view(&self) -> DashboardView {
        self.view.lock().await.clone()
    }

    /// Handle a change of the input controls.
    pub async fn on_input(&self, input: DashboardInput) -> Result<DashboardView, DashboardError> {
        let mut request_id = 0;
        self.latest.send_modify(|id| {
            *id += 1;
            request_id = *id;
        });
        let mut newer = self.latest.subscribe();

        let filter = input.filter();
        let (params, notice) = match Self::read_controls(&input) {
            Ok(read) => read,
            Err(e) => {
                tracing::info!("Request {} rejected: {}", request_id, e);
                let view = DashboardView::errored(request_id, None, e.to_string());
                return self.publish(request_id, view).await;
            }
        };

        {
            let mut current = self.view.lock().await;
            if *self.latest.borrow() == request_id {
                *current = DashboardView::loading(request_id, Some(params.clone()), filter);
            }
        }
        tracing::info!(
            "Request {}: {:?} over {} in {}",
            request_id,
            params.keywords(),
            params.timeframe(),
            if params.geo().is_empty() { "worldwide" } else { params.geo() }
        );

        let view = tokio::select! {
            view = self.refresh(request_id, &params, filter, notice) => view,
            _ = wait_until_superseded(&mut newer, request_id) => {
                tracing::info!("Request {} cancelled by a newer input", request_id);
                return Err(DashboardError::Superseded(request_id));
            }
        };

        self.publish(request_id, view).await
    }

    /// Re-filter the top regions chart of what is on screen. No network.
    pub async fn apply_region_filter(&self, filter: RegionFilter) -> Result<DashboardView, DashboardError> {
        let filter = filter.normalized();
        let mut view = self.view.lock().await;
        let table = view
            .time_series
            .as_ref()
            .map(|spec| spec.table.clone())
            .ok_or(DashboardError::NothingDisplayed)?;

        view.filter = filter;
        view.top_regions = self.top_regions(&table, filter);
        Ok(view.clone())
    }

    /// The table behind the displayed time series chart.
    pub async fn displayed_table(&self) -> Result<TrendTable, DashboardError> {
        self.view
            .lock()
            .await
            .time_series
            .as_ref()
            .map(|spec| spec.table.clone())
            .ok_or(DashboardError::NothingDisplayed)
    }

    fn read_controls(input: &DashboardInput) -> Result<(QueryParams, Option<Alert>), QueryError> {
        let parsed = parse_keywords(&input.keywords);
        let timeframe: Timeframe = input.timeframe.parse()?;
        let geo = country_code(&input.country);
        let params = QueryParams::new(parsed.keywords, timeframe, geo)?;
        let notice = parsed
            .trimmed
            .then(|| Alert::info(format!("Only the first {MAX_KEYWORDS} keywords were used.")));
        Ok((params, notice))
    }

    async fn refresh(
        &self,
        request_id: u64,
        params: &QueryParams,
        filter: RegionFilter,
        notice: Option<Alert>,
    ) -> DashboardView {
        let table = match self.provider.fetch(params).await {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("Request {} failed: {}", request_id, e);
                let mut message = e.to_string();
                if notice.is_some() {
                    message.push_str(&format!(" Note: only the first {MAX_KEYWORDS} keywords are used."));
                }
                return DashboardView::errored(request_id, Some(params.clone()), message);
            }
        };
        let related = self.provider.related(params).await;

        let time_series = match self.charts.build(&table, ChartKind::Line) {
            Ok(spec) => spec,
            Err(e) => return DashboardView::errored(request_id, Some(params.clone()), e.to_string()),
        };

        DashboardView {
            phase: DashboardPhase::Displayed,
            request_id,
            params: Some(params.clone()),
            region_label: region_label(params.geo()),
            filter,
            alert: notice,
            comparison: self.optional(&table, ChartKind::Bar),
            region_map: self.optional(&table, ChartKind::GeoMap),
            top_regions: self.top_regions(&table, filter),
            related: Some(self.charts.related_table(&related)),
            time_series: Some(time_series),
        }
    }

    fn optional(&self, table: &TrendTable, kind: ChartKind) -> Option<ChartSpec> {
        self.charts
            .build(table, kind)
            .inspect(|spec| {
                if spec.is_warning() {
                    tracing::debug!("{} chart shows a warning: {:?}", kind, spec.warning);
                }
            })
            .map_err(|e| tracing::debug!("Skipping {} chart: {}", kind, e))
            .ok()
    }

    fn top_regions(&self, table: &TrendTable, filter: RegionFilter) -> Option<ChartSpec> {
        match self.charts.build_top_regions(table, filter) {
            Ok(spec) => Some(spec),
            Err(e @ (ChartError::MissingGeoBreakdown | ChartError::NoMatchingRegions { .. })) => {
                tracing::debug!("No top regions chart: {}", e);
                None
            }
            Err(e) => {
                tracing::warn!("Top regions chart failed: {}", e);
                None
            }
        }
    }

    /// Store a finished view unless a newer request has started meanwhile.
    async fn publish(&self, request_id: u64, view: DashboardView) -> Result<DashboardView, DashboardError> {
        let mut current = self.view.lock().await;
        if *self.latest.borrow() != request_id {
            return Err(DashboardError::Superseded(request_id));
        }
        *current = view;
        Ok(current.clone())
    }
}

async fn wait_until_superseded(newer: &mut watch::Receiver<u64>, request_id: u64) {
    loop {
        if *newer.borrow_and_update() != request_id {
            return;
        }
        if newer.changed().await.is_err() {
            // Sender gone: nothing can supersede us any more
            std::future::pending::<()>().await;
        }
    }
}

fn region_label(geo: &str) -> String {
    if geo.is_empty() {
        return "Worldwide".to_string();
    }
    country_name(geo).map(str::to_string).unwrap_or_else(|| geo.to_string())
}
