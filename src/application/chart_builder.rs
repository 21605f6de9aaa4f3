// Chart builder - Pure translation of trend tables into chart specs
use crate::domain::chart::{ChartKind, ChartSpec, DisplayOptions, RelatedTable, Trace};
use crate::domain::dashboard::RegionFilter;
use crate::domain::trend::{RankedQuery, RelatedQueries, Resolution, TrendTable};
use thiserror::Error;

/// Plotly's "Vivid" qualitative palette
pub const VIVID: [&str; 11] = [
    "rgb(229, 134, 6)",
    "rgb(93, 105, 177)",
    "rgb(82, 188, 163)",
    "rgb(153, 201, 69)",
    "rgb(204, 97, 176)",
    "rgb(36, 121, 108)",
    "rgb(218, 165, 27)",
    "rgb(47, 138, 196)",
    "rgb(118, 78, 159)",
    "rgb(237, 100, 90)",
    "rgb(165, 170, 153)",
];

pub const MISSING_REGIONS_WARNING: &str = "No regional breakdown is available for this query.";
pub const SUB_REGIONS_WARNING: &str = "The map shows countries only. See Top Regions for the breakdown inside the selected country.";

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("cannot chart an empty table")]
    EmptyTable,

    #[error("unsupported chart kind: {0}")]
    UnsupportedKind(String),

    #[error("table has no regional breakdown")]
    MissingGeoBreakdown,

    #[error("no region has at least {min_interest} interest")]
    NoMatchingRegions { min_interest: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartTheme {
    pub template: String,
    pub color_sequence: Vec<String>,
    pub continuous_scale: String,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            template: "plotly_white".to_string(),
            color_sequence: VIVID.iter().map(|c| c.to_string()).collect(),
            continuous_scale: "Tealgrn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChartBuilder {
    theme: ChartTheme,
}

impl ChartBuilder {
    pub fn new(theme: ChartTheme) -> Self {
        Self { theme }
    }

    /// Build one chart. Same table and kind always give the same spec.
    pub fn build(&self, table: &TrendTable, kind: ChartKind) -> Result<ChartSpec, ChartError> {
        if table.is_empty() {
            return Err(ChartError::EmptyTable);
        }
        match kind {
            ChartKind::Line => Ok(self.line(table)),
            ChartKind::Bar => Ok(self.comparison(table)),
            ChartKind::GeoMap => Ok(self.geo_map(table)),
            ChartKind::TopRegions => self.build_top_regions(table, RegionFilter::default()),
            ChartKind::Warning => Err(ChartError::UnsupportedKind(kind.to_string())),
        }
    }

    /// Bar chart of the first keyword's strongest regions.
    pub fn build_top_regions(&self, table: &TrendTable, filter: RegionFilter) -> Result<ChartSpec, ChartError> {
        if table.is_empty() {
            return Err(ChartError::EmptyTable);
        }
        let keyword = &table.keywords()[0];
        let scores = table
            .regions()
            .and_then(|r| r.scores_for(keyword))
            .ok_or(ChartError::MissingGeoBreakdown)?;

        let filter = filter.normalized();
        let mut top: Vec<(&str, f64)> = scores
            .into_iter()
            .filter(|(_, score)| *score >= filter.min_interest)
            .collect();
        if top.is_empty() {
            return Err(ChartError::NoMatchingRegions {
                min_interest: filter.min_interest,
            });
        }
        // Stable sort keeps provider order among ties
        top.sort_by(|a, b| b.1.total_cmp(&a.1));
        top.truncate(filter.top_n);

        let trace = Trace::Bar {
            name: keyword.clone(),
            x: top.iter().map(|(name, _)| name.to_string()).collect(),
            y: top.iter().map(|(_, score)| *score).collect(),
            colors: None,
            color_scale: Some(self.theme.continuous_scale.clone()),
        };

        Ok(ChartSpec {
            kind: ChartKind::TopRegions,
            title: format!("Top Regions for '{}'", keyword),
            table: table.clone(),
            traces: vec![trace],
            options: DisplayOptions {
                hover_mode: "closest".to_string(),
                x_title: "Region".to_string(),
                x_tick_angle: Some(-30),
                markers: false,
                ..self.options()
            },
            warning: None,
        })
    }

    /// Flatten related searches into a table: top if present, else rising.
    pub fn related_table(&self, related: &RelatedQueries) -> RelatedTable {
        let (queries, note) = match (&related.top, &related.rising) {
            (Some(top), _) if !top.is_empty() => (top, "Showing top related queries."),
            (_, Some(rising)) if !rising.is_empty() => (
                rising,
                "'Top' not available for this combo, showing rising queries instead.",
            ),
            _ => {
                return RelatedTable {
                    note: "No related queries available for this keyword/timeframe/region.".to_string(),
                    ..RelatedTable::default()
                };
            }
        };

        RelatedTable {
            columns: vec!["query".to_string(), "value".to_string()],
            rows: queries.iter().map(related_row).collect(),
            note: note.to_string(),
        }
    }

    fn line(&self, table: &TrendTable) -> ChartSpec {
        let x = table.timestamps();
        let traces = table
            .keywords()
            .iter()
            .enumerate()
            .map(|(i, keyword)| Trace::Line {
                name: keyword.clone(),
                x: x.clone(),
                y: table.column(i),
                color: self.color(i),
            })
            .collect();

        ChartSpec {
            kind: ChartKind::Line,
            title: "Interest Over Time".to_string(),
            table: table.clone(),
            traces,
            options: self.options(),
            warning: None,
        }
    }

    fn comparison(&self, table: &TrendTable) -> ChartSpec {
        let means = table
            .column_means()
            .into_iter()
            .map(|m| (m * 10.0).round() / 10.0)
            .collect();
        let colors = (0..table.keywords().len()).map(|i| self.color(i)).collect();

        ChartSpec {
            kind: ChartKind::Bar,
            title: "Average Interest".to_string(),
            table: table.clone(),
            traces: vec![Trace::Bar {
                name: "Average interest".to_string(),
                x: table.keywords().to_vec(),
                y: means,
                colors: Some(colors),
                color_scale: None,
            }],
            options: DisplayOptions {
                hover_mode: "closest".to_string(),
                x_title: "Keyword".to_string(),
                markers: false,
                ..self.options()
            },
            warning: None,
        }
    }

    fn geo_map(&self, table: &TrendTable) -> ChartSpec {
        let keyword = &table.keywords()[0];
        let Some(regions) = table.regions() else {
            return self.warning(table, "Interest by Country", MISSING_REGIONS_WARNING);
        };
        // Choropleth locations are matched as country names
        if regions.resolution != Resolution::Country {
            return self.warning(table, "Interest by Country", SUB_REGIONS_WARNING);
        }
        let Some(scores) = regions.scores_for(keyword) else {
            return self.warning(table, "Interest by Country", MISSING_REGIONS_WARNING);
        };
        if scores.is_empty() {
            return self.warning(table, "Interest by Country", MISSING_REGIONS_WARNING);
        }

        ChartSpec {
            kind: ChartKind::GeoMap,
            title: "Interest by Country".to_string(),
            table: table.clone(),
            traces: vec![Trace::Choropleth {
                locations: scores.iter().map(|(name, _)| name.to_string()).collect(),
                z: scores.iter().map(|(_, score)| *score).collect(),
                location_mode: "country names".to_string(),
                color_scale: self.theme.continuous_scale.clone(),
            }],
            options: DisplayOptions {
                hover_mode: "closest".to_string(),
                x_title: String::new(),
                y_title: String::new(),
                markers: false,
                ..self.options()
            },
            warning: None,
        }
    }

    fn warning(&self, table: &TrendTable, title: &str, message: &str) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Warning,
            title: title.to_string(),
            table: table.clone(),
            traces: Vec::new(),
            options: self.options(),
            warning: Some(message.to_string()),
        }
    }

    fn options(&self) -> DisplayOptions {
        DisplayOptions {
            template: self.theme.template.clone(),
            title_x: 0.02,
            hover_mode: "x unified".to_string(),
            legend_title: "Keyword".to_string(),
            x_title: "Date".to_string(),
            y_title: "Interest".to_string(),
            markers: true,
            x_tick_angle: None,
        }
    }

    fn color(&self, index: usize) -> String {
        if self.theme.color_sequence.is_empty() {
            return VIVID[index % VIVID.len()].to_string();
        }
        self.theme.color_sequence[index % self.theme.color_sequence.len()].clone()
    }
}

fn related_row(query: &RankedQuery) -> Vec<String> {
    let value = if query.formatted_value.is_empty() {
        query.value.to_string()
    } else {
        query.formatted_value.clone()
    };
    vec![query.query.clone(), value]
}
