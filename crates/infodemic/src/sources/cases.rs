use std::io::Read;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::Period;
use crate::month::Observation;
use crate::prelude::*;

/// The location that aggregates all countries.
pub(crate) const WORLD: &str = "World";

#[derive(Debug, Deserialize)]
struct Record {
    location: String,
    #[serde(default)]
    continent: Option<String>,
    date: NaiveDate,
    #[serde(default)]
    new_cases: Option<f64>,
}

/// Daily confirmed cases, globally and per continent.
#[derive(Debug, Default)]
pub(crate) struct Cases {
    pub(crate) global: Vec<Observation>,
    pub(crate) by_continent: Vec<Observation>,
}

/// Parses the Our World in Data case table.
///
/// The `World` row carries the global count. Country rows carry their
/// continent; regional aggregates (empty continent) other than `World`
/// are skipped so that no country is counted twice. Missing counts are
/// treated as zero.
pub(crate) fn parse<R: Read>(
    reader: R,
    period: &Period,
) -> InfodemicResult<Cases> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut cases = Cases::default();

    for result in reader.deserialize::<Record>() {
        let record = result?;
        if !period.contains(&record.date) {
            continue;
        }

        let value = record.new_cases.unwrap_or(0.0);
        match record.continent {
            Some(continent) if !continent.is_empty() => {
                cases.by_continent.push(Observation::new(
                    record.date,
                    continent,
                    value,
                ));
            }
            _ if record.location == WORLD => {
                cases
                    .global
                    .push(Observation::new(record.date, WORLD, value));
            }
            _ => continue,
        }
    }

    if cases.global.is_empty() {
        log::warn!("case table has no '{WORLD}' rows within the period");
    }

    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    const DATA: &str = "\
iso_code,continent,location,date,total_cases,new_cases
DEU,Europe,Germany,2020-12-31,100,10
DEU,Europe,Germany,2021-01-01,120,20
FRA,Europe,France,2021-01-01,50,
OWID_EUR,,Europe,2021-01-01,170,20
JPN,Asia,Japan,2021-01-02,9,3
OWID_WRL,,World,2021-01-01,300,23
OWID_WRL,,World,2021-01-02,303,3
";

    fn period() -> Period {
        Period {
            start: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2021, 3, 31).unwrap(),
        }
    }

    #[test]
    fn parse_world_and_continents() -> TestResult {
        let cases = parse(DATA.as_bytes(), &period())?;

        let global: Vec<f64> = cases.global.iter().map(|o| o.value).collect();
        assert_eq!(global, vec![23.0, 3.0]);
        assert!(cases.global.iter().all(|o| o.group == WORLD));

        let continents: Vec<(&str, f64)> = cases
            .by_continent
            .iter()
            .map(|o| (o.group.as_str(), o.value))
            .collect();
        assert_eq!(
            continents,
            vec![("Europe", 20.0), ("Europe", 0.0), ("Asia", 3.0)]
        );
        Ok(())
    }

    #[test]
    fn parse_invalid_date() {
        let data = "continent,location,date,new_cases\n,World,yesterday,1\n";
        assert!(parse(data.as_bytes(), &period()).is_err());
    }
}
