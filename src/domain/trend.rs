// Trend data domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("row at {timestamp} has {found} values, expected {expected}")]
    ColumnMismatch {
        timestamp: DateTime<Utc>,
        expected: usize,
        found: usize,
    },
    #[error("region {geo_code} has {found} values, expected {expected}")]
    RegionColumnMismatch {
        geo_code: String,
        expected: usize,
        found: usize,
    },
    #[error("duplicate keyword column: {0}")]
    DuplicateKeyword(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    pub timestamp: DateTime<Utc>,
    pub values: Vec<f64>,
    /// The newest bucket is still accumulating and will be revised.
    pub is_partial: bool,
}

impl TrendRow {
    pub fn new(timestamp: DateTime<Utc>, values: Vec<f64>, is_partial: bool) -> Self {
        Self {
            timestamp,
            values,
            is_partial,
        }
    }
}

/// Interest over time: one column per keyword, rows strictly ordered by
/// timestamp, plus an optional per-region breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendTable {
    keywords: Vec<String>,
    rows: Vec<TrendRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    regions: Option<RegionTable>,
}

impl TrendTable {
    /// Sorts rows chronologically; a repeated timestamp keeps the last row seen.
    pub fn new(keywords: Vec<String>, rows: Vec<TrendRow>) -> Result<Self, TableError> {
        check_unique(&keywords)?;

        let mut by_time = BTreeMap::new();
        for row in rows {
            if row.values.len() != keywords.len() {
                return Err(TableError::ColumnMismatch {
                    timestamp: row.timestamp,
                    expected: keywords.len(),
                    found: row.values.len(),
                });
            }
            by_time.insert(row.timestamp, row);
        }

        Ok(Self {
            keywords,
            rows: by_time.into_values().collect(),
            regions: None,
        })
    }

    pub fn with_regions(mut self, regions: RegionTable) -> Self {
        self.regions = Some(regions);
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn rows(&self) -> &[TrendRow] {
        &self.rows
    }

    pub fn regions(&self) -> Option<&RegionTable> {
        self.regions.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r.values[index]).collect()
    }

    /// Average interest per keyword, in column order.
    pub fn column_means(&self) -> Vec<f64> {
        if self.rows.is_empty() {
            return vec![0.0; self.keywords.len()];
        }
        let count = self.rows.len() as f64;
        (0..self.keywords.len())
            .map(|i| self.rows.iter().map(|r| r.values[i]).sum::<f64>() / count)
            .collect()
    }
}

/// Granularity of a regional breakdown, named the way the provider names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Resolution {
    #[default]
    Country,
    Region,
    City,
    Dma,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Country => "COUNTRY",
            Resolution::Region => "REGION",
            Resolution::City => "CITY",
            Resolution::Dma => "DMA",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRow {
    pub geo_code: String,
    pub geo_name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionTable {
    pub resolution: Resolution,
    keywords: Vec<String>,
    rows: Vec<RegionRow>,
}

impl RegionTable {
    pub fn new(resolution: Resolution, keywords: Vec<String>, rows: Vec<RegionRow>) -> Result<Self, TableError> {
        check_unique(&keywords)?;
        if let Some(bad) = rows.iter().find(|r| r.values.len() != keywords.len()) {
            return Err(TableError::RegionColumnMismatch {
                geo_code: bad.geo_code.clone(),
                expected: keywords.len(),
                found: bad.values.len(),
            });
        }
        Ok(Self {
            resolution,
            keywords,
            rows,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (name, score) pairs for one keyword, in provider order.
    pub fn scores_for(&self, keyword: &str) -> Option<Vec<(&str, f64)>> {
        let index = self.keywords.iter().position(|k| k == keyword)?;
        Some(
            self.rows
                .iter()
                .map(|r| (r.geo_name.as_str(), r.values[index]))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedQuery {
    pub query: String,
    pub value: f64,
    /// Display form, e.g. "Breakout" or "+250%" for rising queries.
    pub formatted_value: String,
}

/// Related searches for the first keyword of a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelatedQueries {
    pub keyword: String,
    pub top: Option<Vec<RankedQuery>>,
    pub rising: Option<Vec<RankedQuery>>,
}

fn check_unique(keywords: &[String]) -> Result<(), TableError> {
    for (i, keyword) in keywords.iter().enumerate() {
        if keywords[..i].contains(keyword) {
            return Err(TableError::DuplicateKeyword(keyword.clone()));
        }
    }
    Ok(())
}
