// Dashboard domain model
use super::chart::{ChartSpec, RelatedTable};
use super::query::QueryParams;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_N: usize = 10;
pub const TOP_N_RANGE: (usize, usize) = (5, 50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardPhase {
    #[default]
    Idle,
    Loading,
    Displayed,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Info,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Info,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Danger,
            message: message.into(),
        }
    }
}

/// Filters applied to the top-regions chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionFilter {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub min_interest: f64,
}

impl RegionFilter {
    pub fn new(top_n: usize, min_interest: f64) -> Self {
        Self {
            top_n: top_n.clamp(TOP_N_RANGE.0, TOP_N_RANGE.1),
            min_interest: if min_interest.is_finite() {
                min_interest.clamp(0.0, 100.0)
            } else {
                0.0
            },
        }
    }

    pub fn normalized(self) -> Self {
        Self::new(self.top_n, self.min_interest)
    }
}

impl Default for RegionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N, 0.0)
    }
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// Raw state of the input controls, exactly as the page submits it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardInput {
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub timeframe: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub min_interest: Option<f64>,
}

impl DashboardInput {
    pub fn filter(&self) -> RegionFilter {
        RegionFilter::new(
            self.top_n.unwrap_or(DEFAULT_TOP_N),
            self.min_interest.unwrap_or(0.0),
        )
    }
}

/// Everything the page needs to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub phase: DashboardPhase,
    pub request_id: u64,
    pub params: Option<QueryParams>,
    pub region_label: String,
    pub filter: RegionFilter,
    pub alert: Option<Alert>,
    pub time_series: Option<ChartSpec>,
    pub comparison: Option<ChartSpec>,
    pub region_map: Option<ChartSpec>,
    pub top_regions: Option<ChartSpec>,
    pub related: Option<RelatedTable>,
}

impl DashboardView {
    pub fn loading(request_id: u64, params: Option<QueryParams>, filter: RegionFilter) -> Self {
        Self {
            phase: DashboardPhase::Loading,
            request_id,
            params,
            filter,
            ..Self::default()
        }
    }

    pub fn errored(request_id: u64, params: Option<QueryParams>, message: impl Into<String>) -> Self {
        Self {
            phase: DashboardPhase::Errored,
            request_id,
            params,
            alert: Some(Alert::danger(message)),
            ..Self::default()
        }
    }
}
