use crate::catalog::{Axis, StyleHint};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One flat attribute record as delivered by an upstream feed.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Inclusive calendar range. `start > end` is allowed and selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// A column cut to a date range, tagged for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeriesSlice {
    pub chart: String,
    pub series: String,
    pub label: String,
    pub style: StyleHint,
    pub axis: Axis,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChartSummary {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChartResponse {
    pub id: String,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub series: Vec<NamedSeriesSlice>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MultiviewOption {
    pub label: String,
    pub series: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MultiviewResponse {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub series: Vec<NamedSeriesSlice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatesResponse {
    pub series: String,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub states: Vec<NamedSeriesSlice>,
    pub stale: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TableSummary {
    pub source: String,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub rows: usize,
    pub columns: Vec<String>,
    pub stale: bool,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatesQuery {
    pub series: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MultiviewQuery {
    pub series: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}
