use crate::errors::SeriesError;
use crate::stats;
use crate::table::TimeSeriesTable;

/// Moving-average and positivity window used by every dashboard.
pub const DEFAULT_WINDOW: usize = 7;

/// One derived column and the columns it is computed from.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedFieldSpec {
    DailyDelta {
        base: String,
        output: String,
    },
    CumulativeSum {
        base: String,
        output: String,
    },
    MovingAverage {
        base: String,
        output: String,
        window: usize,
    },
    PerCapita {
        base: String,
        output: String,
        population: f64,
    },
    Percentage {
        numerator: String,
        denominator: String,
        output: String,
        window: usize,
    },
}

impl DerivedFieldSpec {
    pub fn daily_delta(base: &str, output: &str) -> Self {
        Self::DailyDelta {
            base: base.into(),
            output: output.into(),
        }
    }

    pub fn cumulative_sum(base: &str, output: &str) -> Self {
        Self::CumulativeSum {
            base: base.into(),
            output: output.into(),
        }
    }

    pub fn moving_average(base: &str, output: &str, window: usize) -> Self {
        Self::MovingAverage {
            base: base.into(),
            output: output.into(),
            window,
        }
    }

    pub fn per_capita(base: &str, output: &str, population: f64) -> Self {
        Self::PerCapita {
            base: base.into(),
            output: output.into(),
            population,
        }
    }

    pub fn percentage(numerator: &str, denominator: &str, output: &str, window: usize) -> Self {
        Self::Percentage {
            numerator: numerator.into(),
            denominator: denominator.into(),
            output: output.into(),
            window,
        }
    }

    pub fn output(&self) -> &str {
        match self {
            Self::DailyDelta { output, .. }
            | Self::CumulativeSum { output, .. }
            | Self::MovingAverage { output, .. }
            | Self::PerCapita { output, .. }
            | Self::Percentage { output, .. } => output,
        }
    }

    /// Columns this spec reads.
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Self::DailyDelta { base, .. }
            | Self::CumulativeSum { base, .. }
            | Self::MovingAverage { base, .. }
            | Self::PerCapita { base, .. } => vec![base.as_str()],
            Self::Percentage {
                numerator,
                denominator,
                ..
            } => vec![numerator.as_str(), denominator.as_str()],
        }
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Option<f64>>, SeriesError> {
        let column = |name: &str| {
            table
                .column(name)
                .ok_or_else(|| SeriesError::UnknownBaseField(name.to_string()))
        };

        match self {
            Self::DailyDelta { base, .. } => Ok(stats::daily_delta(column(base)?)),
            Self::CumulativeSum { base, .. } => Ok(stats::cumulative_sum(column(base)?)),
            Self::MovingAverage {
                base,
                output,
                window,
            } => {
                let values = column(base)?;
                check_window(output, *window)?;
                Ok(stats::moving_average(values, *window))
            }
            Self::PerCapita {
                base,
                output,
                population,
            } => {
                let values = column(base)?;
                if !population.is_finite() || *population <= 0.0 {
                    return Err(SeriesError::InvalidPopulation {
                        output: output.clone(),
                        value: *population,
                    });
                }
                Ok(stats::per_100k(values, *population))
            }
            Self::Percentage {
                numerator,
                denominator,
                output,
                window,
            } => {
                let num = column(numerator)?;
                let den = column(denominator)?;
                check_window(output, *window)?;
                Ok(stats::windowed_percentage(num, den, *window))
            }
        }
    }
}

fn check_window(output: &str, window: usize) -> Result<(), SeriesError> {
    if window == 0 {
        return Err(SeriesError::InvalidWindow(output.to_string()));
    }
    Ok(())
}

/// Applies `specs` in order and returns a new table carrying the extra columns.
///
/// A spec may read a column produced by an earlier spec in the same call.
/// The input table is left untouched.
pub fn derive_columns(
    table: &TimeSeriesTable,
    specs: &[DerivedFieldSpec],
) -> Result<TimeSeriesTable, SeriesError> {
    let mut derived = table.clone();
    for spec in specs {
        let values = spec.compute(&derived)?;
        derived = derived.with_column(spec.output(), values);
    }
    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n)
            .map(|d| NaiveDate::from_ymd_opt(2020, 5, d).unwrap())
            .collect()
    }

    fn cases_table() -> TimeSeriesTable {
        TimeSeriesTable::from_columns(
            dates(4),
            [
                ("cases", vec![Some(10.0), Some(15.0), Some(13.0), Some(20.0)]),
                ("tests", vec![Some(100.0), Some(100.0), Some(100.0), Some(100.0)]),
            ],
        )
    }

    #[test]
    fn inputs_name_every_base_column() {
        let delta = DerivedFieldSpec::daily_delta("Recovered", "Recovered_Daily_Change");
        assert_eq!(delta.inputs(), ["Recovered"]);
        let rate = DerivedFieldSpec::percentage("cases", "tests", "rate", DEFAULT_WINDOW);
        assert_eq!(rate.inputs(), ["cases", "tests"]);
    }

    #[test]
    fn delta_and_cumulative_columns() {
        let table = derive_columns(
            &cases_table(),
            &[
                DerivedFieldSpec::daily_delta("cases", "cases_delta"),
                DerivedFieldSpec::cumulative_sum("cases", "cases_cum"),
            ],
        )
        .unwrap();

        assert_eq!(
            table.column("cases_delta").unwrap(),
            &[None, Some(5.0), Some(-2.0), Some(7.0)]
        );
        assert_eq!(
            table.column("cases_cum").unwrap(),
            &[Some(10.0), Some(25.0), Some(38.0), Some(58.0)]
        );
    }

    #[test]
    fn later_specs_can_read_earlier_outputs() {
        let table = derive_columns(
            &cases_table(),
            &[
                DerivedFieldSpec::daily_delta("cases", "delta"),
                DerivedFieldSpec::moving_average("delta", "delta_ma2", 2),
            ],
        )
        .unwrap();

        assert_eq!(
            table.column("delta_ma2").unwrap(),
            &[None, None, Some(1.5), Some(2.5)]
        );
    }

    #[test]
    fn unknown_base_field_is_reported() {
        let err = derive_columns(
            &cases_table(),
            &[DerivedFieldSpec::moving_average("Recovered", "Recovered7dMA", 7)],
        )
        .unwrap_err();
        assert_eq!(err, SeriesError::UnknownBaseField("Recovered".into()));
    }

    #[test]
    fn forward_reference_is_unknown_at_its_turn() {
        let err = derive_columns(
            &cases_table(),
            &[
                DerivedFieldSpec::moving_average("delta", "delta_ma", 2),
                DerivedFieldSpec::daily_delta("cases", "delta"),
            ],
        )
        .unwrap_err();
        assert_eq!(err, SeriesError::UnknownBaseField("delta".into()));
    }

    #[test]
    fn input_table_is_not_mutated() {
        let base = cases_table();
        let before = base.clone();
        derive_columns(&base, &[DerivedFieldSpec::daily_delta("cases", "d")]).unwrap();
        assert_eq!(base, before);
        assert!(!base.has_column("d"));
    }

    #[test]
    fn derivation_is_repeatable_and_independent_specs_commute() {
        let base = cases_table();
        let a = DerivedFieldSpec::cumulative_sum("cases", "cum");
        let b = DerivedFieldSpec::percentage("cases", "tests", "pct", 2);

        let first = derive_columns(&base, &[a.clone(), b.clone()]).unwrap();
        let again = derive_columns(&base, &[a.clone(), b.clone()]).unwrap();
        let swapped = derive_columns(&base, &[b, a]).unwrap();

        assert_eq!(first, again);
        assert_eq!(first, swapped);
    }

    #[test]
    fn per_capita_scenario() {
        let table = TimeSeriesTable::from_columns(dates(1), [("positive", vec![Some(250.0)])]);
        let derived = derive_columns(
            &table,
            &[DerivedFieldSpec::per_capita("positive", "positive_per100k", 100_000.0)],
        )
        .unwrap();
        assert_eq!(derived.column("positive_per100k").unwrap(), &[Some(250.0)]);
    }

    #[test]
    fn per_capita_rejects_zero_population() {
        let err = derive_columns(
            &cases_table(),
            &[DerivedFieldSpec::per_capita("cases", "rate", 0.0)],
        )
        .unwrap_err();
        assert!(matches!(err, SeriesError::InvalidPopulation { .. }));
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = derive_columns(
            &cases_table(),
            &[DerivedFieldSpec::moving_average("cases", "ma", 0)],
        )
        .unwrap_err();
        assert_eq!(err, SeriesError::InvalidWindow("ma".into()));
    }

    #[test]
    fn seven_day_average_needs_seven_rows() {
        let table = TimeSeriesTable::from_columns(dates(7), [("cases", vec![Some(14.0); 7])]);
        let derived = derive_columns(
            &table,
            &[DerivedFieldSpec::moving_average("cases", "ma", DEFAULT_WINDOW)],
        )
        .unwrap();
        let ma = derived.column("ma").unwrap();
        assert_eq!(ma[6], Some(14.0));
        assert_eq!(ma[5], None);
    }
}
