//! Column transforms over positional, date-ordered values.
//!
//! Every function returns one output per input row. A missing input never
//! turns into a zero in the output; it makes the affected output missing.

/// `out[i] = v[i] - v[i - 1]`; missing on the first row or when either side is missing.
pub fn daily_delta(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<Option<f64>> = None;
    for value in values {
        let delta = match (prev, value) {
            (Some(Some(p)), Some(v)) => Some(v - p),
            _ => None,
        };
        out.push(delta);
        prev = Some(*value);
    }
    out
}

/// Running sum. Missing rows contribute nothing but do not reset the total;
/// rows before the first present value stay missing.
pub fn cumulative_sum(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut total: Option<f64> = None;
    values
        .iter()
        .map(|value| {
            if let Some(v) = value {
                total = Some(total.unwrap_or(0.0) + v);
            }
            total
        })
        .collect()
}

/// Trailing mean over `window` rows. Missing until a full window of present
/// values exists; any missing value inside the window makes it missing.
pub fn moving_average(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    windowed(values, window)
        .map(|w| w.map(|sum| sum / window as f64))
        .collect()
}

/// `mean(num) / mean(den) * 100` over trailing windows. A window whose
/// denominator mean is zero is missing.
pub fn windowed_percentage(
    numerator: &[Option<f64>],
    denominator: &[Option<f64>],
    window: usize,
) -> Vec<Option<f64>> {
    windowed(numerator, window)
        .zip(windowed(denominator, window))
        .map(|(num, den)| match (num, den) {
            // equal window lengths cancel out of the two means
            (Some(num), Some(den)) if den != 0.0 => Some(num / den * 100.0),
            _ => None,
        })
        .collect()
}

/// `v / population * 100_000`. The caller validates `population`.
pub fn per_100k(values: &[Option<f64>], population: f64) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|value| value.map(|v| v / population * 100_000.0))
        .collect()
}

/// Sum of each trailing window, or `None` when it is short or has a gap.
fn windowed(values: &[Option<f64>], window: usize) -> impl Iterator<Item = Option<f64>> + '_ {
    (0..values.len()).map(move |i| {
        if window == 0 || i + 1 < window {
            return None;
        }
        values[i + 1 - window..=i]
            .iter()
            .try_fold(0.0, |acc, v| v.map(|v| acc + v))
    })
}
