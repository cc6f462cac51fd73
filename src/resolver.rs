use crate::catalog::{Axis, Catalog, SeriesSpec, StyleHint};
use crate::errors::SeriesError;
use crate::models::{DateRange, NamedSeriesSlice};
use crate::table::TimeSeriesTable;

const MULTIVIEW_LABEL: &str = "Multiview Chart";

/// `(slug, label)` for every chart in the catalog, in menu order.
pub fn list_charts(catalog: &Catalog) -> Vec<(&'static str, &'static str)> {
    catalog
        .charts
        .iter()
        .map(|id| (id.slug(), id.definition().label))
        .collect()
}

/// Cuts every series a chart declares out of `table`.
///
/// Every declared series must exist in the table; a missing one fails the
/// whole call instead of producing a silently empty line.
pub fn resolve(
    catalog: &Catalog,
    chart_id: &str,
    table: &TimeSeriesTable,
    range: DateRange,
) -> Result<Vec<NamedSeriesSlice>, SeriesError> {
    let chart = catalog
        .find(chart_id)
        .ok_or_else(|| SeriesError::UnknownChart(chart_id.to_string()))?;

    ensure_present(table, chart.series.iter().map(|spec| spec.name))?;

    chart
        .series
        .iter()
        .map(|spec| slice_spec(table, chart.label, spec, range))
        .collect()
}

/// Overlays any set of columns. Duplicates are resolved once, in the order
/// they were first requested; an empty request yields an empty result.
pub fn resolve_multi<S: AsRef<str>>(
    catalog: &Catalog,
    series_names: &[S],
    table: &TimeSeriesTable,
    range: DateRange,
) -> Result<Vec<NamedSeriesSlice>, SeriesError> {
    let mut names: Vec<&str> = Vec::with_capacity(series_names.len());
    for name in series_names {
        let name = name.as_ref();
        if !names.contains(&name) {
            names.push(name);
        }
    }

    ensure_present(table, names.iter().copied())?;

    names
        .into_iter()
        .map(|name| {
            Ok(NamedSeriesSlice {
                chart: MULTIVIEW_LABEL.to_string(),
                series: name.to_string(),
                label: catalog.multiview_label(name).unwrap_or(name).to_string(),
                style: StyleHint::Line,
                axis: Axis::Primary,
                points: table.slice(name, range)?,
            })
        })
        .collect()
}

fn ensure_present<'a>(
    table: &TimeSeriesTable,
    mut names: impl Iterator<Item = &'a str>,
) -> Result<(), SeriesError> {
    match names.find(|name| !table.has_column(name)) {
        Some(missing) => Err(SeriesError::UnknownSeries(missing.to_string())),
        None => Ok(()),
    }
}

fn slice_spec(
    table: &TimeSeriesTable,
    chart_label: &str,
    spec: &SeriesSpec,
    range: DateRange,
) -> Result<NamedSeriesSlice, SeriesError> {
    let mut points = table.slice(spec.name, range)?;
    if spec.skip_missing {
        points.retain(|point| point.value.is_some());
    }
    if spec.absolute {
        for point in &mut points {
            point.value = point.value.map(f64::abs);
        }
    }

    Ok(NamedSeriesSlice {
        chart: chart_label.to_string(),
        series: spec.name.to_string(),
        label: spec.label.to_string(),
        style: spec.style,
        axis: spec.axis,
        points,
    })
}
