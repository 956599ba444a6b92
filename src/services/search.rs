//! Search and facet filtering over the disruption feed.
//!
//! DESIGN
//! ======
//! A record passes `Filters` when it passes every non-empty facet: the text
//! query is a case-insensitive substring of the description, each set facet
//! is membership, and the date range is inclusive from the start of the
//! first day to the end of the last (UTC). Severity, status, and region are
//! closed vocabularies and unknown values are rejected; types are open
//! because upstream feeds may introduce new categories, so they match
//! case-insensitively without validation.
//!
//! The same query shape arrives two ways: REST query strings with
//! comma-separated facet values, and websocket `search:query` frames where a
//! facet may also be a JSON array.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::frame::Data;
use crate::model::{Disruption, DisruptionStatus, Region, Severity};

pub const DEFAULT_PAGE_LIMIT: usize = 50;
pub const MAX_PAGE_LIMIT: usize = 500;

const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("unknown {facet} value: {value}")]
    UnknownFacetValue { facet: &'static str, value: String },
    #[error("invalid {key} date (expected YYYY-MM-DD): {value}")]
    InvalidDate { key: &'static str, value: String },
    #[error("invalid {key}: {value}")]
    InvalidNumber { key: &'static str, value: String },
}

impl crate::frame::ErrorCode for SearchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownFacetValue { .. } => "E_UNKNOWN_FACET",
            Self::InvalidDate { .. } => "E_INVALID_DATE",
            Self::InvalidNumber { .. } => "E_INVALID_PAGE",
        }
    }
}

// =============================================================================
// FILTERS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub search: String,
    pub severity: Vec<Severity>,
    pub types: Vec<String>,
    pub status: Vec<DisruptionStatus>,
    pub region: Vec<Region>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

impl Filters {
    #[must_use]
    pub fn matches(&self, d: &Disruption) -> bool {
        let query = self.search.trim();
        if !query.is_empty() && !d.description.to_lowercase().contains(&query.to_lowercase()) {
            return false;
        }
        if !self.severity.is_empty() && !self.severity.contains(&d.severity) {
            return false;
        }
        if !self.types.is_empty() && !self.types.iter().any(|t| t.eq_ignore_ascii_case(&d.kind)) {
            return false;
        }
        if !self.status.is_empty() && !self.status.contains(&d.status) {
            return false;
        }
        if !self.region.is_empty() && !self.region.contains(&d.region) {
            return false;
        }
        if self.date_start.map(start_of_day).is_some_and(|start| d.timestamp < start) {
            return false;
        }
        if self.date_end.map(end_of_day).is_some_and(|end| d.timestamp > end) {
            return false;
        }
        true
    }

    /// Records passing every facet, order preserved.
    #[must_use]
    pub fn apply(&self, records: &[Disruption]) -> Vec<Disruption> {
        records.iter().filter(|d| self.matches(d)).cloned().collect()
    }

    /// Selected facet values, with the date range counting once. The text
    /// query is not a facet.
    #[must_use]
    pub fn active_filter_count(&self) -> usize {
        let date = usize::from(self.date_start.is_some() || self.date_end.is_some());
        self.severity.len() + self.types.len() + self.status.len() + self.region.len() + date
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.active_filter_count() == 0
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last = chrono::NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(chrono::NaiveTime::MIN);
    date.and_time(last).and_utc()
}

// =============================================================================
// PAGINATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self { offset: 0, limit: DEFAULT_PAGE_LIMIT }
    }
}

impl Page {
    /// Clamps `limit` to `1..=MAX_PAGE_LIMIT`.
    #[must_use]
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit: limit.clamp(1, MAX_PAGE_LIMIT) }
    }

    #[must_use]
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items.iter().skip(self.offset).take(self.limit).cloned().collect()
    }
}

/// One page of filtered results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub active_filters: usize,
    pub items: Vec<Disruption>,
}

/// Filter then paginate. `total` counts every match, not just the page.
#[must_use]
pub fn search(records: &[Disruption], filters: &Filters, page: Page) -> SearchResults {
    let matched = filters.apply(records);
    SearchResults {
        total: matched.len(),
        offset: page.offset,
        limit: page.limit,
        active_filters: filters.active_filter_count(),
        items: page.slice(&matched),
    }
}

// =============================================================================
// QUERY PARSING
// =============================================================================

/// Raw query-string form, as extracted by axum's `Query`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default, alias = "search")]
    pub q: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchQuery {
    /// # Errors
    ///
    /// Rejects unknown severity/status/region values and malformed dates.
    pub fn parse(&self) -> Result<(Filters, Page), SearchError> {
        let filters = Filters {
            search: self.q.clone().unwrap_or_default(),
            severity: parse_facet(self.severity.as_deref(), "severity", Severity::parse)?,
            types: split_csv(self.kind.as_deref()).map(str::to_string).collect(),
            status: parse_facet(self.status.as_deref(), "status", DisruptionStatus::parse)?,
            region: parse_facet(self.region.as_deref(), "region", Region::parse)?,
            date_start: parse_date(self.start.as_deref(), "start")?,
            date_end: parse_date(self.end.as_deref(), "end")?,
        };
        let page = Page::new(self.offset.unwrap_or(0), self.limit.unwrap_or(DEFAULT_PAGE_LIMIT));
        Ok((filters, page))
    }

    /// Build from websocket frame data. Facets may be strings or arrays of
    /// strings; numbers may be JSON numbers or numeric strings.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidNumber` for a non-numeric offset or limit.
    pub fn from_data(data: &Data) -> Result<Self, SearchError> {
        Ok(Self {
            q: data_text(data, "q").or_else(|| data_text(data, "search")),
            severity: data_text(data, "severity"),
            kind: data_text(data, "type"),
            status: data_text(data, "status"),
            region: data_text(data, "region"),
            start: data_text(data, "start"),
            end: data_text(data, "end"),
            offset: data_number(data, "offset")?,
            limit: data_number(data, "limit")?,
        })
    }
}

fn split_csv(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_facet<T: PartialEq>(
    raw: Option<&str>,
    facet: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Vec<T>, SearchError> {
    let mut values = Vec::new();
    for item in split_csv(raw) {
        let value = parse(item).ok_or_else(|| SearchError::UnknownFacetValue { facet, value: item.to_string() })?;
        if !values.contains(&value) {
            values.push(value);
        }
    }
    Ok(values)
}

fn parse_date(raw: Option<&str>, key: &'static str) -> Result<Option<NaiveDate>, SearchError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|_| SearchError::InvalidDate { key, value: s.to_string() }),
    }
}

fn data_text(data: &Data, key: &str) -> Option<String> {
    match data.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(serde_json::Value::as_str).collect();
            Some(parts.join(","))
        }
        _ => None,
    }
}

fn data_number(data: &Data, key: &'static str) -> Result<Option<usize>, SearchError> {
    match data.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| SearchError::InvalidNumber { key, value: n.to_string() }),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SearchError::InvalidNumber { key, value: s.clone() }),
        Some(other) => Err(SearchError::InvalidNumber { key, value: other.to_string() }),
    }
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
