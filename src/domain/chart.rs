// Chart domain models - declarative specs the browser turns into figures
use super::trend::TrendTable;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    GeoMap,
    TopRegions,
    /// Output-only: a placeholder carrying a message instead of data.
    Warning,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::GeoMap => "geo_map",
            ChartKind::TopRegions => "top_regions",
            ChartKind::Warning => "warning",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One drawable layer of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    Line {
        name: String,
        x: Vec<DateTime<Utc>>,
        y: Vec<f64>,
        color: String,
    },
    Bar {
        name: String,
        x: Vec<String>,
        y: Vec<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        colors: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color_scale: Option<String>,
    },
    Choropleth {
        locations: Vec<String>,
        z: Vec<f64>,
        location_mode: String,
        color_scale: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayOptions {
    pub template: String,
    pub title_x: f64,
    pub hover_mode: String,
    pub legend_title: String,
    pub x_title: String,
    pub y_title: String,
    pub markers: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_tick_angle: Option<i32>,
}

/// A chart, fully described. Built fresh from a [`TrendTable`] each time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub table: TrendTable,
    pub traces: Vec<Trace>,
    pub options: DisplayOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ChartSpec {
    pub fn is_warning(&self) -> bool {
        self.kind == ChartKind::Warning
    }
}

/// Related searches flattened for a plain HTML table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelatedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub note: String,
}
