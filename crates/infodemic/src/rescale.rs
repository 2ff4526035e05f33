//! Min-max rescaling and the combined table.

use polars::prelude::*;

use crate::month;
use crate::prelude::*;

/// A row of the combined table.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CombinedRow {
    pub(crate) month: String,
    pub(crate) source: String,
    pub(crate) value: f64,
    pub(crate) scaled: f64,
}

/// Maps values linearly onto `[0, 100]`.
///
/// The smallest value maps to `0` and the largest to `100`. A constant
/// series has no range to map and is rescaled to `0` throughout.
pub(crate) fn min_max(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|value| {
            if range > 0.0 {
                (value - min) / range * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Merges monthly tables into one table of comparable series.
///
/// Each source is rescaled on its own. Sources appear in the given
/// order, months in ascending order.
pub(crate) fn combine(
    sources: &[(&str, &DataFrame)],
) -> InfodemicResult<DataFrame> {
    let mut month = vec![];
    let mut source = vec![];
    let mut value = vec![];
    let mut scaled = vec![];

    for (name, df) in sources.iter() {
        let rows = month::rows(df)?;
        let values: Vec<f64> = rows.iter().map(|row| row.value).collect();

        for (row, rescaled) in rows.into_iter().zip(min_max(&values)) {
            month.push(row.month);
            source.push(name.to_string());
            value.push(row.value);
            scaled.push(rescaled);
        }
    }

    Ok(DataFrame::new(vec![
        Series::new("month", month),
        Series::new("source", source),
        Series::new("value", value),
        Series::new("scaled", scaled),
    ])?)
}

/// Reads the rows of the combined table.
pub(crate) fn rows(df: &DataFrame) -> InfodemicResult<Vec<CombinedRow>> {
    let month = df.column("month")?.str()?;
    let source = df.column("source")?.str()?;
    let value = df.column("value")?.f64()?;
    let scaled = df.column("scaled")?.f64()?;

    (0..df.height())
        .map(|idx| {
            let (Some(month), Some(source)) =
                (month.get(idx), source.get(idx))
            else {
                bail!("missing month or source in row {idx}");
            };

            Ok(CombinedRow {
                month: month.to_string(),
                source: source.to_string(),
                value: value.get(idx).unwrap_or(0.0),
                scaled: scaled.get(idx).unwrap_or(0.0),
            })
        })
        .collect()
}
