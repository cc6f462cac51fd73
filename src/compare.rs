//! Side-by-side state comparison.
//!
//! Each state keeps its own repository over its tracking feed; a comparison
//! cuts the same column out of every state's table and labels each line with
//! the state code.

use crate::catalog::{Axis, StyleHint};
use crate::errors::SeriesError;
use crate::models::{DateRange, NamedSeriesSlice};
use crate::repository::SeriesRepository;
use crate::table::TimeSeriesTable;
use chrono::NaiveDate;
use std::sync::Arc;

/// Columns a comparison can draw, with their chart titles.
pub const STATE_SERIES: &[(&str, &str)] = &[
    ("positive", "Total Positive Cases by State"),
    ("positive_per100k", "Positive Cases per 100k by State"),
    ("death", "Total Deaths by State"),
    ("death_per100k", "Deaths per 100k by State"),
];

pub fn state_series_label(series: &str) -> Option<&'static str> {
    STATE_SERIES
        .iter()
        .find(|(name, _)| *name == series)
        .map(|(_, label)| *label)
}

/// One table per compared state.
#[derive(Debug, Clone)]
pub struct StateTables {
    pub tables: Vec<(String, Arc<TimeSeriesTable>)>,
    /// Set when any state fell back to an older snapshot.
    pub stale: bool,
}

impl StateTables {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.tables.iter().filter_map(|(_, t)| t.first_date()).min()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.tables.iter().filter_map(|(_, t)| t.last_date()).max()
    }
}

/// The configured states, in the order they were listed.
pub struct StateBoard {
    states: Vec<(String, Arc<SeriesRepository>)>,
    default_start: NaiveDate,
}

impl StateBoard {
    pub fn new(states: Vec<(String, SeriesRepository)>, default_start: NaiveDate) -> Self {
        Self {
            states: states
                .into_iter()
                .map(|(code, repository)| (code, Arc::new(repository)))
                .collect(),
            default_start,
        }
    }

    pub fn empty(default_start: NaiveDate) -> Self {
        Self::new(Vec::new(), default_start)
    }

    pub fn default_start(&self) -> NaiveDate {
        self.default_start
    }

    pub fn repositories(&self) -> impl Iterator<Item = &SeriesRepository> {
        self.states.iter().map(|(_, repository)| repository.as_ref())
    }

    /// Reads every state. One unreachable state without any snapshot fails
    /// the whole comparison.
    pub async fn tables(&self) -> Result<StateTables, SeriesError> {
        let mut tables = Vec::with_capacity(self.states.len());
        let mut stale = false;
        for (code, repository) in &self.states {
            let reading = repository.read().await?;
            stale |= reading.stale;
            tables.push((code.clone(), reading.table));
        }
        Ok(StateTables { tables, stale })
    }
}

/// Cuts `series` out of every state's table, one line per state.
///
/// Only the comparison columns are accepted, and every state must carry the
/// column before anything is sliced.
pub fn resolve_states(
    tables: &[(String, Arc<TimeSeriesTable>)],
    series: &str,
    range: DateRange,
) -> Result<Vec<NamedSeriesSlice>, SeriesError> {
    let label = state_series_label(series)
        .ok_or_else(|| SeriesError::UnknownSeries(series.to_string()))?;

    if let Some((code, _)) = tables.iter().find(|(_, table)| !table.has_column(series)) {
        return Err(SeriesError::UnknownSeries(format!("{series} ({code})")));
    }

    tables
        .iter()
        .map(|(code, table)| {
            Ok(NamedSeriesSlice {
                chart: label.to_string(),
                series: series.to_string(),
                label: code.to_ascii_uppercase(),
                style: StyleHint::Line,
                axis: Axis::Primary,
                points: table.slice(series, range)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 4, d).unwrap()
    }

    fn state(code: &str, positive: [f64; 3], with_deaths: bool) -> (String, Arc<TimeSeriesTable>) {
        let mut columns = vec![("positive", positive.map(Some).to_vec())];
        if with_deaths {
            columns.push(("death", vec![Some(1.0), Some(1.0), Some(2.0)]));
        }
        let table = TimeSeriesTable::from_columns(vec![day(1), day(2), day(3)], columns);
        (code.to_string(), Arc::new(table))
    }

    #[test]
    fn one_line_per_state_in_listed_order() {
        let tables = vec![
            state("TX", [10.0, 20.0, 30.0], true),
            state("NY", [50.0, 70.0, 90.0], true),
        ];

        let slices = resolve_states(&tables, "positive", DateRange::new(day(2), day(3))).unwrap();

        let labels: Vec<_> = slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["TX", "NY"]);
        assert!(slices.iter().all(|s| s.chart == "Total Positive Cases by State"));
        let ny: Vec<_> = slices[1].points.iter().map(|p| p.value).collect();
        assert_eq!(ny, vec![Some(70.0), Some(90.0)]);
    }

    #[test]
    fn only_comparison_columns_are_accepted() {
        let tables = vec![state("TX", [1.0, 2.0, 3.0], true)];
        let err =
            resolve_states(&tables, "hospitalizedCurrently", DateRange::new(day(1), day(3)))
                .unwrap_err();
        assert_eq!(err, SeriesError::UnknownSeries("hospitalizedCurrently".into()));
    }

    #[test]
    fn a_state_missing_the_column_fails_the_comparison() {
        let tables = vec![
            state("TX", [1.0, 2.0, 3.0], true),
            state("NY", [1.0, 2.0, 3.0], false),
        ];
        let err = resolve_states(&tables, "death", DateRange::new(day(1), day(3))).unwrap_err();
        assert_eq!(err, SeriesError::UnknownSeries("death (NY)".into()));
    }

    #[test]
    fn coverage_spans_every_state() {
        let early = TimeSeriesTable::from_columns(vec![day(1)], [("positive", vec![Some(1.0)])]);
        let late = TimeSeriesTable::from_columns(vec![day(9)], [("positive", vec![Some(1.0)])]);
        let tables = StateTables {
            tables: vec![("TX".into(), Arc::new(late)), ("NY".into(), Arc::new(early))],
            stale: false,
        };
        assert_eq!(tables.first_date(), Some(day(1)));
        assert_eq!(tables.last_date(), Some(day(9)));
    }
}
