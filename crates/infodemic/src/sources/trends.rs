use chrono::NaiveDate;

use crate::config::Period;
use crate::month::Observation;
use crate::prelude::*;

pub(crate) const GROUP: &str = "trends";

/// Parses the date of a trends row (`YYYY-MM-DD` or `YYYY-MM`).
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"))
        .ok()
}

/// Parses a search-interest value.
///
/// Values below the reporting threshold are reported as `<1` by the
/// search-trend service; these and all numbers below `threshold` are
/// zero.
fn parse_hits(s: &str, threshold: f64) -> InfodemicResult<f64> {
    let s = s.trim();
    if s.starts_with('<') {
        return Ok(0.0);
    }

    let Ok(hits) = s.parse::<f64>() else {
        bail!("invalid search-interest value '{s}'");
    };

    Ok(if hits < threshold { 0.0 } else { hits })
}

/// Parses a search-interest export.
///
/// Exports start with a free-form preamble and a header line; only
/// rows whose first field is a date are data rows. The second field
/// holds the value.
pub(crate) fn parse(
    data: &[u8],
    threshold: f64,
    period: &Period,
) -> InfodemicResult<Vec<Observation>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut observations = vec![];

    for result in reader.records() {
        let record = result?;
        let Some(date) = record.get(0).and_then(parse_date) else {
            continue;
        };

        let Some(hits) = record.get(1) else {
            bail!("missing search-interest value for {date}");
        };

        if period.contains(&date) {
            let value = parse_hits(hits, threshold)?;
            observations.push(Observation::new(date, GROUP, value));
        }
    }

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    fn period() -> Period {
        Period {
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
        }
    }

    #[test]
    fn parse_export_with_preamble() -> TestResult {
        let data = "Category: All categories\n\
            \n\
            Week,coronavirus: (Worldwide)\n\
            2019-12-29,<1\n\
            2020-01-05,<1\n\
            2020-01-12,2\n\
            2020-03-15,100\n";

        let observations = parse(data.as_bytes(), 1.0, &period())?;
        let values: Vec<f64> = observations.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![0.0, 2.0, 100.0]);
        assert!(observations.iter().all(|o| o.group == GROUP));
        Ok(())
    }

    #[test]
    fn parse_monthly_dates() -> TestResult {
        let data = "Month,covid\n2021-01,40\n2021-02,0.5\n";
        let observations = parse(data.as_bytes(), 1.0, &period())?;

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].date.to_string(), "2021-01-01");
        assert_eq!(observations[1].value, 0.0);
        Ok(())
    }

    #[test]
    fn parse_hits_threshold() -> TestResult {
        assert_eq!(parse_hits("<1", 1.0)?, 0.0);
        assert_eq!(parse_hits(" 3 ", 5.0)?, 0.0);
        assert_eq!(parse_hits("5", 5.0)?, 5.0);
        assert!(parse_hits("n/a", 1.0).is_err());
        Ok(())
    }
}
