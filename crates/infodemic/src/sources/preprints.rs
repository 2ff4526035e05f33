use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::config::{Period, PreprintsConfig};
use crate::fetch::Fetcher;
use crate::month::Observation;
use crate::prelude::*;

pub(crate) const GROUP: &str = "preprints";

const PBAR_FETCH: &str =
    "Fetching preprints: {human_pos}/{human_len} ({percent}%) | \
        elapsed: {elapsed_precise}{msg}";

/// Metadata of a single preprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Preprint {
    pub(crate) date: NaiveDate,
    pub(crate) title: String,
    #[serde(rename = "abstract", default)]
    pub(crate) abstract_: String,
    #[serde(default)]
    pub(crate) doi: String,
    #[serde(default)]
    pub(crate) category: String,
}

impl Preprint {
    /// Returns the free text of the preprint.
    pub(crate) fn text(&self) -> String {
        format!("{} {}", self.title, self.abstract_)
    }
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default)]
    collection: Vec<Preprint>,
}

#[derive(Debug, Deserialize)]
struct Message {
    /// The API reports the total both as number and as string.
    #[serde(default)]
    total: Option<serde_json::Value>,
}

impl Page {
    fn total(&self) -> Option<u64> {
        self.messages.iter().find_map(|message| {
            match message.total.as_ref()? {
                serde_json::Value::Number(n) => n.as_u64(),
                serde_json::Value::String(s) => s.parse().ok(),
                _ => None,
            }
        })
    }
}

/// Keyword filter over title and abstract.
#[derive(Debug)]
pub(crate) struct Matcher {
    re: Regex,
}

impl Matcher {
    pub(crate) fn new(queries: &[String]) -> InfodemicResult<Self> {
        if queries.is_empty() {
            bail!("preprint query list is empty");
        }

        let pattern = queries
            .iter()
            .map(|query| regex::escape(query))
            .collect::<Vec<_>>()
            .join("|");

        let re = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(InfodemicError::other)?;

        Ok(Self { re })
    }

    #[inline]
    pub(crate) fn is_match(&self, preprint: &Preprint) -> bool {
        self.re.is_match(&preprint.title)
            || self.re.is_match(&preprint.abstract_)
    }
}

fn parse_page(data: &[u8]) -> InfodemicResult<Page> {
    Ok(serde_json::from_slice(data)?)
}

/// Pages through a remote endpoint. `get_page` receives the cursor,
/// i.e. the number of records read so far. Paging stops on an empty
/// page or once the reported total is reached.
fn fetch_pages<F>(
    mut get_page: F,
    quiet: bool,
) -> InfodemicResult<Vec<Preprint>>
where
    F: FnMut(u64) -> InfodemicResult<Vec<u8>>,
{
    let pbar = ProgressBarBuilder::new(PBAR_FETCH, quiet).build();
    let mut records = vec![];
    let mut cursor = 0u64;

    loop {
        let page = parse_page(&get_page(cursor)?)?;
        let total = page.total();
        if let Some(total) = total {
            pbar.set_length(total);
        }

        if page.collection.is_empty() {
            break;
        }

        cursor += page.collection.len() as u64;
        pbar.set_position(cursor);
        records.extend(page.collection);

        if total.is_some_and(|total| cursor >= total) {
            break;
        }
    }

    pbar.finish_using_style();
    Ok(records)
}

/// Fetches all preprints and keeps those matching the query list and
/// the reporting period.
///
/// A remote endpoint is paged through by appending the cursor to the
/// location; a local snapshot is read as a single page.
pub(crate) fn fetch(
    fetcher: &Fetcher,
    config: &PreprintsConfig,
    period: &Period,
    quiet: bool,
) -> InfodemicResult<Vec<Preprint>> {
    let matcher = Matcher::new(&config.queries)?;
    let location = config.location(period);

    let records = if Fetcher::is_remote(&location) {
        let base = location.trim_end_matches('/');
        fetch_pages(
            |cursor| fetcher.get(&format!("{base}/{cursor}")),
            quiet,
        )?
    } else {
        parse_page(&fetcher.get(&location)?)?.collection
    };

    let total = records.len();
    let preprints: Vec<Preprint> = records
        .into_iter()
        .filter(|preprint| period.contains(&preprint.date))
        .filter(|preprint| matcher.is_match(preprint))
        .collect();

    log::info!(
        "kept {} of {total} preprints matching the query list",
        preprints.len()
    );

    Ok(preprints)
}

/// Returns one unit observation per preprint.
pub(crate) fn observations(preprints: &[Preprint]) -> Vec<Observation> {
    preprints
        .iter()
        .map(|preprint| Observation::new(preprint.date, GROUP, 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    const SNAPSHOT: &str = r#"{
        "messages": [{"status": "ok", "cursor": 0, "count": 3, "total": "3"}],
        "collection": [
            {"doi": "10.1101/1", "title": "SARS-CoV-2 transmission in schools",
             "abstract": "We model transmission.", "date": "2021-01-04",
             "category": "epidemiology"},
            {"doi": "10.1101/2", "title": "Influenza vaccines",
             "abstract": "Seasonal influenza uptake.", "date": "2021-01-05",
             "category": "infectious diseases"},
            {"doi": "10.1101/3", "title": "Hospital capacity",
             "abstract": "Effects of the COVID-19 surge on ICU beds.",
             "date": "2021-02-11", "category": "health policy"}
        ]
    }"#;

    fn queries() -> Vec<String> {
        vec!["covid".into(), "sars-cov-2".into()]
    }

    #[test]
    fn page_total_number_or_string() -> TestResult {
        let page = parse_page(SNAPSHOT.as_bytes())?;
        assert_eq!(page.total(), Some(3));

        let page = parse_page(br#"{"messages": [{"total": 12}]}"#)?;
        assert_eq!(page.total(), Some(12));
        assert!(page.collection.is_empty());
        Ok(())
    }

    #[test]
    fn matcher_is_case_insensitive() -> TestResult {
        let matcher = Matcher::new(&queries())?;
        let page = parse_page(SNAPSHOT.as_bytes())?;
        let matches: Vec<bool> =
            page.collection.iter().map(|p| matcher.is_match(p)).collect();

        assert_eq!(matches, vec![true, false, true]);
        assert!(Matcher::new(&[]).is_err());
        Ok(())
    }

    fn page(total: &str, dois: &[&str]) -> Vec<u8> {
        let collection: Vec<String> = dois
            .iter()
            .map(|doi| {
                format!(
                    r#"{{"doi": "{doi}", "title": "COVID-19 {doi}",
                        "abstract": "", "date": "2021-01-04"}}"#
                )
            })
            .collect();

        format!(
            r#"{{"messages": [{{"total": {total}}}], "collection": [{}]}}"#,
            collection.join(",")
        )
        .into_bytes()
    }

    #[test]
    fn fetch_pages_until_total() -> TestResult {
        let mut cursors = vec![];
        let records = fetch_pages(
            |cursor| {
                cursors.push(cursor);
                Ok(match cursor {
                    0 => page("\"5\"", &["a", "b"]),
                    2 => page("\"5\"", &["c", "d"]),
                    4 => page("\"5\"", &["e"]),
                    _ => page("\"5\"", &["unexpected"]),
                })
            },
            true,
        )?;

        let dois: Vec<&str> =
            records.iter().map(|p| p.doi.as_str()).collect();
        assert_eq!(cursors, vec![0, 2, 4]);
        assert_eq!(dois, vec!["a", "b", "c", "d", "e"]);
        Ok(())
    }

    #[test]
    fn fetch_pages_stops_on_empty_page() -> TestResult {
        let mut cursors = vec![];
        let records = fetch_pages(
            |cursor| {
                cursors.push(cursor);
                Ok(match cursor {
                    0 => page("100", &["a", "b", "c"]),
                    _ => page("100", &[]),
                })
            },
            true,
        )?;

        assert_eq!(cursors, vec![0, 3]);
        assert_eq!(records.len(), 3);
        Ok(())
    }

    #[test]
    fn fetch_pages_propagates_errors() {
        let result = fetch_pages(
            |cursor| match cursor {
                0 => Ok(page("4", &["a", "b"])),
                _ => Err(InfodemicError::other("connection reset")),
            },
            true,
        );

        assert!(result.is_err());
    }

    #[test]
    fn fetch_local_snapshot() -> TestResult {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("preprints.json"), SNAPSHOT)?;

        let fetcher = Fetcher::new(dir.path())?;
        let config = PreprintsConfig {
            url: "preprints.json".into(),
            queries: queries(),
        };
        let period = Period {
            start: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2021, 1, 31).unwrap(),
        };

        let preprints = fetch(&fetcher, &config, &period, true)?;
        assert_eq!(preprints.len(), 1);
        assert_eq!(preprints[0].doi, "10.1101/1");
        assert_eq!(
            preprints[0].text(),
            "SARS-CoV-2 transmission in schools We model transmission."
        );

        let observations = observations(&preprints);
        assert_eq!(observations[0].value, 1.0);
        assert_eq!(observations[0].group, GROUP);
        Ok(())
    }
}
