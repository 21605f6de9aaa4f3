// Query domain model - what the user asked the trends provider for
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The provider refuses comparisons of more than five terms.
pub const MAX_KEYWORDS: usize = 5;

const QUOTE_CHARS: &[char] = &['"', '\'', '“', '”', '‘', '’'];

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Please enter at least one keyword.")]
    NoKeywords,
    #[error("At most 5 keywords can be compared (got {0})")]
    TooManyKeywords(usize),
    #[error("Duplicate keyword: {0}")]
    DuplicateKeyword(String),
    #[error("Unsupported timeframe: {0}")]
    InvalidTimeframe(String),
}

/// Relative presets understood by the provider, paired with their UI label.
pub const TIMEFRAME_PRESETS: &[(&str, &str)] = &[
    ("now 1-H", "Now 1 hour"),
    ("now 4-H", "Now 4 hours"),
    ("now 1-d", "Now 1 day"),
    ("now 7-d", "Now 7 days"),
    ("today 1-m", "Today 1 month"),
    ("today 3-m", "Today 3 months"),
    ("today 12-m", "Today 12 months"),
    ("today 5-y", "Today 5 years"),
    ("all", "All time"),
];

pub const DEFAULT_TIMEFRAME: &str = "today 1-m";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Timeframe {
    Preset(&'static str),
    Range { start: NaiveDate, end: NaiveDate },
}

impl Timeframe {
    pub fn as_provider_string(&self) -> String {
        match self {
            Timeframe::Preset(value) => value.to_string(),
            Timeframe::Range { start, end } => {
                format!("{} {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
            }
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Preset(DEFAULT_TIMEFRAME)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_provider_string())
    }
}

impl From<Timeframe> for String {
    fn from(timeframe: Timeframe) -> Self {
        timeframe.as_provider_string()
    }
}

impl FromStr for Timeframe {
    type Err = QueryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Timeframe::default());
        }
        if let Some((value, _)) = TIMEFRAME_PRESETS.iter().find(|(value, _)| *value == raw) {
            return Ok(Timeframe::Preset(*value));
        }

        // Absolute ranges look like "2024-01-01 2024-03-31"
        let invalid = || QueryError::InvalidTimeframe(raw.to_string());
        let (start, end) = raw.split_once(' ').ok_or_else(invalid)?;
        let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
        let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
        if start > end {
            return Err(invalid());
        }
        Ok(Timeframe::Range { start, end })
    }
}

/// One request to the trends provider. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    keywords: Vec<String>,
    timeframe: Timeframe,
    geo: String,
}

impl QueryParams {
    pub fn new(keywords: Vec<String>, timeframe: Timeframe, geo: impl Into<String>) -> Result<Self, QueryError> {
        if keywords.is_empty() {
            return Err(QueryError::NoKeywords);
        }
        if keywords.len() > MAX_KEYWORDS {
            return Err(QueryError::TooManyKeywords(keywords.len()));
        }
        let mut seen = HashSet::new();
        for keyword in &keywords {
            if keyword.trim().is_empty() {
                return Err(QueryError::NoKeywords);
            }
            if !seen.insert(keyword.as_str()) {
                return Err(QueryError::DuplicateKeyword(keyword.clone()));
            }
        }

        Ok(Self {
            keywords,
            timeframe,
            geo: geo.into(),
        })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn timeframe(&self) -> &Timeframe {
        &self.timeframe
    }

    /// Empty for worldwide.
    pub fn geo(&self) -> &str {
        &self.geo
    }

    pub fn first_keyword(&self) -> &str {
        &self.keywords[0]
    }
}

/// Result of cleaning the free-text keyword box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKeywords {
    pub keywords: Vec<String>,
    /// More distinct keywords were entered than the provider accepts.
    pub trimmed: bool,
}

/// Split comma separated input, strip whitespace and quotes, drop blanks and
/// duplicates (first occurrence wins) and keep at most [`MAX_KEYWORDS`].
pub fn parse_keywords(raw: &str) -> ParsedKeywords {
    let mut seen = HashSet::new();
    let mut cleaned: Vec<String> = Vec::new();

    for part in raw.split(',') {
        let keyword = part.trim().trim_matches(QUOTE_CHARS).trim();
        if !keyword.is_empty() && seen.insert(keyword.to_string()) {
            cleaned.push(keyword.to_string());
        }
    }

    let trimmed = cleaned.len() > MAX_KEYWORDS;
    cleaned.truncate(MAX_KEYWORDS);

    ParsedKeywords {
        keywords: cleaned,
        trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords_strips_quotes_and_duplicates() {
        let parsed = parse_keywords(" Python, \"Data Science\" , python,Python, ‘Rust’ ,, ");
        assert_eq!(parsed.keywords, vec!["Python", "Data Science", "python", "Rust"]);
        assert!(!parsed.trimmed);
    }

    #[test]
    fn test_parse_keywords_caps_at_five() {
        let parsed = parse_keywords("a, b, c, d, e, f, g");
        assert_eq!(parsed.keywords, vec!["a", "b", "c", "d", "e"]);
        assert!(parsed.trimmed);
    }

    #[test]
    fn test_parse_keywords_empty() {
        let parsed = parse_keywords("  , '' ,");
        assert!(parsed.keywords.is_empty());
        assert!(!parsed.trimmed);
    }

    #[test]
    fn test_timeframe_presets_and_ranges() {
        assert_eq!("today 3-m".parse::<Timeframe>().unwrap(), Timeframe::Preset("today 3-m"));
        assert_eq!("".parse::<Timeframe>().unwrap(), Timeframe::default());

        let range: Timeframe = "2024-01-01 2024-03-31".parse().unwrap();
        assert_eq!(range.as_provider_string(), "2024-01-01 2024-03-31");

        assert!("today 2-w".parse::<Timeframe>().is_err());
        assert!("2024-03-31 2024-01-01".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_query_params_validation() {
        let tf = Timeframe::default();
        assert_eq!(QueryParams::new(vec![], tf.clone(), ""), Err(QueryError::NoKeywords));
        assert_eq!(
            QueryParams::new(vec!["a".into(), "a".into()], tf.clone(), ""),
            Err(QueryError::DuplicateKeyword("a".into()))
        );
        let too_many: Vec<String> = (0..6).map(|i| i.to_string()).collect();
        assert_eq!(QueryParams::new(too_many, tf.clone(), ""), Err(QueryError::TooManyKeywords(6)));

        let params = QueryParams::new(vec!["python".into()], tf, "US").unwrap();
        assert_eq!(params.first_keyword(), "python");
        assert_eq!(params.geo(), "US");
    }
}
