use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::Period;
use crate::month::Observation;
use crate::prelude::*;

pub(crate) const GROUP: &str = "pageviews";

#[derive(Debug, Deserialize)]
struct Response {
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    /// `YYYYMMDDHH`, the hour is always `00`.
    timestamp: String,
    views: f64,
}

/// Parses a per-article page-view response.
pub(crate) fn parse(
    data: &[u8],
    period: &Period,
) -> InfodemicResult<Vec<Observation>> {
    let response: Response = serde_json::from_slice(data)?;
    let mut observations = Vec::with_capacity(response.items.len());

    for item in response.items.into_iter() {
        let Some(day) = item.timestamp.get(0..8) else {
            bail!("invalid page-view timestamp '{}'", item.timestamp);
        };

        let date = NaiveDate::parse_from_str(day, "%Y%m%d").map_err(|_| {
            InfodemicError::other(format!(
                "invalid page-view timestamp '{}'",
                item.timestamp
            ))
        })?;

        if period.contains(&date) {
            observations.push(Observation::new(date, GROUP, item.views));
        }
    }

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn parse_daily_items() -> TestResult {
        let data = r#"{"items": [
            {"project": "en.wikipedia", "article": "COVID-19_pandemic",
             "granularity": "daily", "timestamp": "2020123100",
             "access": "all-access", "agent": "user", "views": 7},
            {"timestamp": "2021010100", "views": 1200},
            {"timestamp": "2021010200", "views": 800}
        ]}"#;

        let period = Period {
            start: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2021, 1, 31).unwrap(),
        };

        let observations = parse(data.as_bytes(), &period)?;
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].date.to_string(), "2021-01-01");
        assert_eq!(observations[1].value, 800.0);
        Ok(())
    }

    #[test]
    fn parse_invalid_timestamp() {
        let data = r#"{"items": [{"timestamp": "2021", "views": 1}]}"#;
        assert!(parse(data.as_bytes(), &Period::default()).is_err());
    }
}
