//! Monthly series.
//!
//! Every source is reduced to a table with the columns `month`
//! (first-of-month date in ISO format), `group` and `value`. The table
//! holds exactly one row per `(group, month)` and is sorted by group
//! and month.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

use crate::prelude::*;

/// A single dated measurement of a source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Observation {
    pub(crate) date: NaiveDate,
    pub(crate) group: String,
    pub(crate) value: f64,
}

impl Observation {
    pub(crate) fn new<S: Into<String>>(
        date: NaiveDate,
        group: S,
        value: f64,
    ) -> Self {
        Self {
            date,
            group: group.into(),
            value,
        }
    }
}

/// A row of a monthly table.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthlyRow {
    pub(crate) month: String,
    pub(crate) group: String,
    pub(crate) value: f64,
}

/// Truncates a date to the first day of its month.
#[inline]
pub(crate) fn month_start(date: &NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(*date)
}

/// Sums the observations of each group within each calendar month.
///
/// Counting is summation of observations with a value of `1.0`.
pub(crate) fn aggregate(
    observations: &[Observation],
) -> InfodemicResult<DataFrame> {
    let month: Vec<String> = observations
        .iter()
        .map(|o| month_start(&o.date).format("%Y-%m-%d").to_string())
        .collect();
    let group: Vec<&str> =
        observations.iter().map(|o| o.group.as_str()).collect();
    let value: Vec<f64> = observations.iter().map(|o| o.value).collect();

    let df = DataFrame::new(vec![
        Series::new("month", month),
        Series::new("group", group),
        Series::new("value", value),
    ])?;

    let df = df
        .lazy()
        .group_by([col("group"), col("month")])
        .agg([col("value").sum()])
        .select([col("month"), col("group"), col("value")])
        .sort(["group", "month"], SortMultipleOptions::default())
        .collect()?;

    Ok(df)
}

/// Reads the rows of a monthly table.
pub(crate) fn rows(df: &DataFrame) -> InfodemicResult<Vec<MonthlyRow>> {
    let month = df.column("month")?.str()?;
    let group = df.column("group")?.str()?;
    let value = df.column("value")?.f64()?;

    (0..df.height())
        .map(|idx| {
            let (Some(month), Some(group)) = (month.get(idx), group.get(idx))
            else {
                bail!("missing month or group in row {idx}");
            };

            Ok(MonthlyRow {
                month: month.to_string(),
                group: group.to_string(),
                value: value.get(idx).unwrap_or(0.0),
            })
        })
        .collect()
}

/// Returns the sum of all values of a monthly table.
pub(crate) fn total(df: &DataFrame) -> InfodemicResult<f64> {
    Ok(rows(df)?.iter().map(|row| row.value).sum())
}

/// Returns the month with the largest value, if any.
pub(crate) fn peak(df: &DataFrame) -> InfodemicResult<Option<MonthlyRow>> {
    Ok(rows(df)?
        .into_iter()
        .reduce(|acc, row| if row.value > acc.value { row } else { acc }))
}
