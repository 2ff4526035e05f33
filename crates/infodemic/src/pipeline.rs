//! Fetch, aggregate and clean everything the report needs.

use polars::prelude::*;

use crate::config::Config;
use crate::fetch::Fetcher;
use crate::month;
use crate::prelude::*;
use crate::rescale;
use crate::sources::{cases, pageviews, preprints, trends};
use crate::text::Cleaner;

/// Name of the global case series in the combined table.
pub(crate) const CASES: &str = "cases";

/// The derived tables of a report build.
#[derive(Debug, Clone)]
pub(crate) struct Tables {
    pub(crate) cases_global: DataFrame,
    pub(crate) cases_continent: DataFrame,
    pub(crate) trends: DataFrame,
    pub(crate) pageviews: DataFrame,
    pub(crate) preprints: DataFrame,
    pub(crate) combined: DataFrame,
    /// Cleaned tokens, one list per preprint.
    pub(crate) tokens: Vec<Vec<String>>,
}

impl Tables {
    #[cfg(test)]
    pub(crate) fn equals(&self, other: &Self) -> bool {
        self.cases_global.equals(&other.cases_global)
            && self.cases_continent.equals(&other.cases_continent)
            && self.trends.equals(&other.trends)
            && self.pageviews.equals(&other.pageviews)
            && self.preprints.equals(&other.preprints)
            && self.combined.equals(&other.combined)
            && self.tokens == other.tokens
    }
}

/// Runs all fetches, the monthly aggregation, the rescaling and the
/// text pipeline.
pub(crate) fn build(
    project: &Project,
    config: &Config,
    quiet: bool,
) -> InfodemicResult<Tables> {
    let fetcher = Fetcher::new(project.base_dir())?;
    let period = &config.period;

    log::info!("fetching case counts from {}", config.cases.url);
    let data = fetcher.get(&config.cases.url)?;
    let cases = cases::parse(data.as_slice(), period)?;

    log::info!("fetching search interest from {}", config.trends.url);
    let trends = trends::parse(
        &fetcher.get(&config.trends.url)?,
        config.trends.threshold,
        period,
    )?;

    let location = config.pageviews.location(period);
    log::info!("fetching page views from {location}");
    let pageviews = pageviews::parse(&fetcher.get(&location)?, period)?;

    log::info!(
        "fetching preprints from {}",
        config.preprints.location(period)
    );
    let preprints =
        preprints::fetch(&fetcher, &config.preprints, period, quiet)?;

    let cases_global = month::aggregate(&cases.global)?;
    let cases_continent = month::aggregate(&cases.by_continent)?;
    let trends = month::aggregate(&trends)?;
    let pageviews = month::aggregate(&pageviews)?;
    let preprint_counts =
        month::aggregate(&preprints::observations(&preprints))?;

    let combined = rescale::combine(&[
        (CASES, &cases_global),
        (trends::GROUP, &trends),
        (pageviews::GROUP, &pageviews),
    ])?;

    let cleaner = Cleaner::from_config(&config.words, project.base_dir())?;
    let tokens = cleaner.clean_all(&preprints, quiet);
    log::info!(
        "{} tokens from {} preprints",
        tokens.iter().map(Vec::len).sum::<usize>(),
        preprints.len()
    );

    Ok(Tables {
        cases_global,
        cases_continent,
        trends,
        pageviews,
        preprints: preprint_counts,
        combined,
        tokens,
    })
}

/// Loads the tables from the cache or builds and persists them.
///
/// A populated cache is used unless its key is stale or `force` is
/// set. Otherwise the tables are rebuilt, and only a successful build
/// replaces the contents of the cache.
pub(crate) fn load_or_build(
    project: &Project,
    config: &Config,
    quiet: bool,
    force: bool,
) -> InfodemicResult<Tables> {
    let cache = project.cache(config)?;

    if !force && cache.is_populated() {
        if cache.is_valid()? {
            log::info!("loading tables from {}", cache.dir().display());
            return cache.load();
        }

        log::warn!(
            "cache {} was built with a different config; rebuilding",
            cache.dir().display()
        );
    }

    let mut tables = build(project, config, quiet)?;
    cache.clear()?;
    cache.store(&mut tables)?;
    Ok(tables)
}
