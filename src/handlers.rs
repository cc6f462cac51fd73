use crate::compare::{STATE_SERIES, resolve_states, state_series_label};
use crate::errors::AppError;
use crate::models::{
    ChartResponse, ChartSummary, DateRange, MultiviewOption, MultiviewQuery, MultiviewResponse,
    RangeQuery, StatesQuery, StatesResponse, TableSummary,
};
use crate::resolver::{list_charts, resolve, resolve_multi};
use crate::state::AppState;
use crate::table::TimeSeriesTable;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use std::sync::Arc;

const EMPTY_SELECTION_PROMPT: &str = "Please select one or more charts to display.";

pub async fn get_charts(State(state): State<AppState>) -> Json<Vec<ChartSummary>> {
    let charts = list_charts(&state.catalog)
        .into_iter()
        .map(|(id, label)| ChartSummary {
            id: id.to_string(),
            label: label.to_string(),
        })
        .collect();
    Json(charts)
}

pub async fn get_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ChartResponse>, AppError> {
    let (table, _) = current_table(&state).await?;
    let range = table_range(&state, &table, query.start.as_deref(), query.end.as_deref())?;
    let series = resolve(&state.catalog, &id, &table, range)?;
    let label = state
        .catalog
        .find(&id)
        .map(|chart| chart.label.to_string())
        .unwrap_or_default();

    Ok(Json(ChartResponse {
        id,
        label,
        start: range.start,
        end: range.end,
        series,
    }))
}

pub async fn get_multiview_options(State(state): State<AppState>) -> Json<Vec<MultiviewOption>> {
    let options = state
        .catalog
        .multiview
        .iter()
        .map(|(label, series)| MultiviewOption {
            label: label.to_string(),
            series: series.to_string(),
        })
        .collect();
    Json(options)
}

pub async fn get_multiview(
    State(state): State<AppState>,
    Query(query): Query<MultiviewQuery>,
) -> Result<Json<MultiviewResponse>, AppError> {
    let names: Vec<&str> = query
        .series
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();

    let (table, _) = current_table(&state).await?;
    let range = table_range(&state, &table, query.start.as_deref(), query.end.as_deref())?;
    let series = resolve_multi(&state.catalog, &names, &table, range)?;
    let prompt = series.is_empty().then(|| EMPTY_SELECTION_PROMPT.to_string());

    Ok(Json(MultiviewResponse {
        start: range.start,
        end: range.end,
        series,
        prompt,
    }))
}

pub async fn get_table(State(state): State<AppState>) -> Result<Json<TableSummary>, AppError> {
    let (table, stale) = current_table(&state).await?;
    Ok(Json(TableSummary {
        source: state.repository.source_name().to_string(),
        first_date: table.first_date(),
        last_date: table.last_date(),
        rows: table.len(),
        columns: table.column_names().map(str::to_string).collect(),
        stale,
    }))
}

pub async fn get_state_options() -> Json<Vec<MultiviewOption>> {
    let options = STATE_SERIES
        .iter()
        .map(|(series, label)| MultiviewOption {
            label: label.to_string(),
            series: series.to_string(),
        })
        .collect();
    Json(options)
}

pub async fn get_states(
    State(state): State<AppState>,
    Query(query): Query<StatesQuery>,
) -> Result<Json<StatesResponse>, AppError> {
    let series = query
        .series
        .as_deref()
        .map(str::trim)
        .filter(|series| !series.is_empty())
        .unwrap_or(STATE_SERIES[0].0)
        .to_string();

    let tables = state.states.tables().await?;
    let coverage = (tables.first_date(), tables.last_date());
    let range = query_range(
        state.states.default_start(),
        coverage,
        query.start.as_deref(),
        query.end.as_deref(),
    )?;
    let states = resolve_states(&tables.tables, &series, range)?;

    Ok(Json(StatesResponse {
        label: state_series_label(&series).unwrap_or_default().to_string(),
        series,
        start: range.start,
        end: range.end,
        states,
        stale: tables.stale,
    }))
}

/// Reads the repository, which falls back to the last snapshot when the
/// upstream is unreachable. The flag reports whether the fallback was used.
async fn current_table(state: &AppState) -> Result<(Arc<TimeSeriesTable>, bool), AppError> {
    let reading = state.repository.read().await?;
    Ok((reading.table, reading.stale))
}

fn table_range(
    state: &AppState,
    table: &TimeSeriesTable,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, AppError> {
    let coverage = (table.first_date(), table.last_date());
    query_range(state.default_start, coverage, start, end)
}

/// Missing bounds default to the dashboard start, clamped to the first
/// date on record, and to the last date on record.
fn query_range(
    default_start: NaiveDate,
    (first, last): (Option<NaiveDate>, Option<NaiveDate>),
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, AppError> {
    let start = match start {
        Some(value) => parse_date("start", value)?,
        None => match first {
            Some(first) => default_start.max(first),
            None => default_start,
        },
    };
    let end = match end {
        Some(value) => parse_date("end", value)?,
        None => last.unwrap_or(start),
    };
    Ok(DateRange::new(start, end))
}

fn parse_date(name: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request(format!("{name} must be YYYY-MM-DD, got `{value}`")))
}
