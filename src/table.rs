use crate::errors::SeriesError;
use crate::models::{DateRange, RawRecord, SeriesPoint};
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::{debug, warn};

/// How a feed encodes its per-row date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// Milliseconds since the Unix epoch (GIS feature services).
    EpochMillis,
    /// `YYYYMMDD`, as a number or a string.
    Compact,
    /// `YYYY-MM-DD`.
    Iso,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateField {
    pub name: String,
    pub format: DateFormat,
}

impl DateField {
    pub fn new(name: impl Into<String>, format: DateFormat) -> Self {
        Self {
            name: name.into(),
            format,
        }
    }

    pub fn parse(&self, record: &RawRecord) -> Result<NaiveDate, SeriesError> {
        let malformed = |value: &Value| SeriesError::MalformedDate {
            field: self.name.clone(),
            value: value.to_string(),
        };
        let value = record.get(&self.name).unwrap_or(&Value::Null);

        let parsed = match (self.format, value) {
            (DateFormat::EpochMillis, Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.date_naive()),
            (DateFormat::EpochMillis, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.date_naive()),
            (DateFormat::Compact, Value::Number(n)) => n
                .as_u64()
                .and_then(|n| NaiveDate::parse_from_str(&n.to_string(), "%Y%m%d").ok()),
            (DateFormat::Compact, Value::String(s)) => {
                NaiveDate::parse_from_str(s.trim(), "%Y%m%d").ok()
            }
            (DateFormat::Iso, Value::String(s)) => {
                let s = s.trim();
                NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").ok()
            }
            _ => None,
        };

        parsed.ok_or_else(|| malformed(value))
    }
}

/// Date-indexed, column-oriented table of optional numeric values.
///
/// Dates are unique and ascending. Columns all have one entry per date;
/// `None` marks a missing value, which is never the same thing as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl TimeSeriesTable {
    /// Builds a table from unordered raw rows.
    ///
    /// Rows whose date cannot be parsed are dropped. When two rows share a
    /// date the later one wins. A key becomes a column as soon as one
    /// surviving row carries a numeric value for it.
    pub fn ingest<'a, I>(rows: I, date_field: &DateField) -> Self
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        let mut by_date: BTreeMap<NaiveDate, &RawRecord> = BTreeMap::new();
        let mut dropped = 0usize;

        for row in rows {
            match date_field.parse(row) {
                Ok(date) => {
                    by_date.insert(date, row);
                }
                Err(err) => {
                    debug!("dropping row: {err}");
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            warn!(dropped, field = %date_field.name, "dropped rows without a usable date");
        }

        let mut names: Vec<&str> = Vec::new();
        for row in by_date.values() {
            for (key, value) in row.iter() {
                let is_new = !names.contains(&key.as_str());
                if key != &date_field.name && is_new && numeric(value).is_some() {
                    names.push(key);
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let values = by_date
                    .values()
                    .map(|row| row.get(name).and_then(numeric))
                    .collect();
                (name.to_string(), values)
            })
            .collect();

        Self {
            dates: by_date.into_keys().collect(),
            columns,
        }
    }

    /// Builds a table from already-ordered columns. Used by tests and
    /// by callers that assemble data outside a feed.
    pub fn from_columns<I, S>(dates: Vec<NaiveDate>, columns: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<Option<f64>>)>,
        S: Into<String>,
    {
        let mut rows: Vec<(NaiveDate, usize)> =
            dates.iter().copied().enumerate().map(|(i, d)| (d, i)).collect();
        rows.sort_by_key(|(date, _)| *date);

        // last occurrence of a date wins
        let mut keep: Vec<(NaiveDate, usize)> = Vec::with_capacity(rows.len());
        for (date, idx) in rows {
            match keep.last_mut() {
                Some(last) if last.0 == date => *last = (date, idx.max(last.1)),
                _ => keep.push((date, idx)),
            }
        }

        let columns = columns
            .into_iter()
            .map(|(name, values)| {
                let reordered = keep
                    .iter()
                    .map(|(_, idx)| values.get(*idx).copied().flatten())
                    .collect();
                (name.into(), reordered)
            })
            .collect();

        Self {
            dates: keep.into_iter().map(|(date, _)| date).collect(),
            columns,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn value(&self, date: NaiveDate, name: &str) -> Option<f64> {
        let idx = self.dates.binary_search(&date).ok()?;
        self.columns.get(name)?.get(idx).copied().flatten()
    }

    /// Row positions whose date falls in `range`. Empty when inverted.
    pub fn index_range(&self, range: DateRange) -> Range<usize> {
        if range.is_inverted() {
            return 0..0;
        }
        let start = self.dates.partition_point(|d| *d < range.start);
        let end = self.dates.partition_point(|d| *d <= range.end);
        start..end.max(start)
    }

    /// Cuts one column to `range`, pairing each date with its value.
    pub fn slice(&self, name: &str, range: DateRange) -> Result<Vec<SeriesPoint>, SeriesError> {
        let values = self
            .column(name)
            .ok_or_else(|| SeriesError::UnknownSeries(name.to_string()))?;
        let rows = self.index_range(range);
        Ok(self.dates[rows.clone()]
            .iter()
            .zip(&values[rows])
            .map(|(date, value)| SeriesPoint {
                date: *date,
                value: *value,
            })
            .collect())
    }

    /// Adds or replaces a column. Only derivation goes through here.
    pub(crate) fn with_column(mut self, name: &str, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(values.len(), self.dates.len());
        self.columns.insert(name.to_string(), values);
        self
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 4, d).unwrap()
    }

    fn compact() -> DateField {
        DateField::new("date", DateFormat::Compact)
    }

    #[test]
    fn ingest_sorts_and_dedups_last_write_wins() {
        let rows = vec![
            record(json!({ "date": 20200403, "positive": 30 })),
            record(json!({ "date": 20200401, "positive": 10 })),
            record(json!({ "date": 20200402, "positive": 20 })),
            record(json!({ "date": 20200401, "positive": 11 })),
        ];

        let table = TimeSeriesTable::ingest(&rows, &compact());
        assert_eq!(table.dates(), &[day(1), day(2), day(3)]);
        assert_eq!(
            table.column("positive").unwrap(),
            &[Some(11.0), Some(20.0), Some(30.0)]
        );
    }

    #[test]
    fn ingest_drops_rows_with_bad_or_absent_dates() {
        let rows = vec![
            record(json!({ "date": 20200401, "positive": 1 })),
            record(json!({ "date": "not a date", "positive": 2 })),
            record(json!({ "date": null, "positive": 3 })),
            record(json!({ "positive": 4 })),
            record(json!({ "date": 20201340, "positive": 5 })),
        ];

        let table = TimeSeriesTable::ingest(&rows, &compact());
        assert_eq!(table.dates(), &[day(1)]);
        assert_eq!(table.column("positive").unwrap(), &[Some(1.0)]);
    }

    #[test]
    fn ingest_keeps_missing_distinct_from_zero() {
        let rows = vec![
            record(json!({ "date": "20200401", "death": 0, "state": "TX" })),
            record(json!({ "date": "20200402", "death": null })),
            record(json!({ "date": "20200403" })),
        ];

        let table = TimeSeriesTable::ingest(&rows, &compact());
        assert_eq!(table.column("death").unwrap(), &[Some(0.0), None, None]);
        assert!(!table.has_column("state"));
        assert!(!table.has_column("date"));
    }

    #[test]
    fn epoch_millis_dates_parse() {
        let field = DateField::new("Date", DateFormat::EpochMillis);
        // 2020-03-19T00:00:00Z
        let row = record(json!({ "Date": 1584576000000i64 }));
        assert_eq!(
            field.parse(&row).unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 19).unwrap()
        );
    }

    #[test]
    fn iso_dates_accept_a_time_suffix() {
        let field = DateField::new("day", DateFormat::Iso);
        let row = record(json!({ "day": "2020-03-19T00:00:00Z" }));
        assert_eq!(
            field.parse(&row).unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 19).unwrap()
        );
    }

    #[test]
    fn malformed_date_names_the_field() {
        let err = compact().parse(&record(json!({ "date": true }))).unwrap_err();
        assert!(matches!(err, SeriesError::MalformedDate { ref field, .. } if field == "date"));
    }

    #[test]
    fn slice_is_inclusive_and_clips_to_coverage() {
        let table = TimeSeriesTable::from_columns(
            vec![day(1), day(2), day(3), day(4)],
            [("cases", vec![Some(1.0), None, Some(3.0), Some(4.0)])],
        );

        let points = table.slice("cases", DateRange::new(day(2), day(3))).unwrap();
        assert_eq!(
            points,
            vec![
                SeriesPoint { date: day(2), value: None },
                SeriesPoint { date: day(3), value: Some(3.0) },
            ]
        );

        let partial = table.slice("cases", DateRange::new(day(3), day(20))).unwrap();
        assert_eq!(partial.len(), 2);

        let outside = table.slice("cases", DateRange::new(day(10), day(20))).unwrap();
        assert!(outside.is_empty());

        let inverted = table.slice("cases", DateRange::new(day(4), day(1))).unwrap();
        assert!(inverted.is_empty());
    }

    #[test]
    fn slice_of_absent_column_is_unknown_series() {
        let table = TimeSeriesTable::from_columns(vec![day(1)], [("cases", vec![Some(1.0)])]);
        let err = table.slice("deaths", DateRange::new(day(1), day(1))).unwrap_err();
        assert_eq!(err, SeriesError::UnknownSeries("deaths".into()));
    }

    #[test]
    fn from_columns_orders_rows() {
        let table = TimeSeriesTable::from_columns(
            vec![day(3), day(1), day(2)],
            [("v", vec![Some(3.0), Some(1.0), Some(2.0)])],
        );
        assert_eq!(table.dates(), &[day(1), day(2), day(3)]);
        assert_eq!(table.value(day(2), "v"), Some(2.0));
    }
}
