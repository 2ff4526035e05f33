use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use semver::Version;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::InfodemicResult;

/// Project config.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Config {
    /// The path of the config.
    #[serde(skip)]
    path: PathBuf,

    /// Report metadata.
    pub(crate) metadata: Metadata,

    /// Runtime options.
    pub(crate) runtime: Option<Runtime>,

    /// The reporting period.
    #[serde(default)]
    pub(crate) period: Period,

    /// Location of derived tables.
    #[serde(default)]
    pub(crate) cache: CacheConfig,

    /// Location of the rendered report.
    #[serde(default)]
    pub(crate) output: OutputConfig,

    /// Confirmed case counts.
    #[serde(default)]
    pub(crate) cases: CasesConfig,

    /// Search-interest index.
    #[serde(default)]
    pub(crate) trends: TrendsConfig,

    /// Encyclopedia page views.
    #[serde(default)]
    pub(crate) pageviews: PageviewsConfig,

    /// Preprint metadata.
    #[serde(default)]
    pub(crate) preprints: PreprintsConfig,

    /// Text pipeline and word cloud options.
    #[serde(default)]
    pub(crate) words: WordsConfig,

    /// This structure should always be constructed using a public
    /// constructor or using the update syntax:
    ///
    /// ```ignore
    /// use crate::config::Config;
    ///
    /// let config = Config {
    ///     ..Default::default()
    /// };
    /// ```
    #[doc(hidden)]
    #[serde(skip)]
    __non_exhaustive: (),
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Metadata {
    /// The name of the report.
    pub(crate) name: String,

    /// The version of the report.
    pub(crate) version: Version,

    /// The headline of the rendered document.
    #[serde(default)]
    pub(crate) title: String,

    /// A short blurb about the report.
    pub(crate) description: Option<String>,

    /// A list of people or organizations, which are considered as the
    /// authors of the report.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub(crate) authors: Vec<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            name: "".into(),
            version: Version::new(0, 1, 0),
            title: "Attention in the time of COVID-19".into(),
            description: None,
            authors: vec![],
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Runtime {
    /// Number of threads to use. If this options isn't set or a value
    /// of "0" is chosen, the maximum number of available threads
    /// is used.
    pub(crate) num_jobs: Option<usize>,
}

/// Inclusive date range; observations outside are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Period {
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
}

impl Default for Period {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
        }
    }
}

impl Period {
    #[inline]
    pub(crate) fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.start && *date <= self.end
    }

    /// Replaces the `{start}` and `{end}` placeholders of a location
    /// with the bounds of the period, formatted with `fmt`.
    pub(crate) fn expand(&self, location: &str, fmt: &str) -> String {
        location
            .replace("{start}", &self.start.format(fmt).to_string())
            .replace("{end}", &self.end.format(fmt).to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CacheConfig {
    pub(crate) dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { dir: "cache".into() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OutputConfig {
    pub(crate) dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: "out".into() }
    }
}

/// Daily confirmed cases per location.
///
/// The location is a remote (`http(s)://`, `file://`) or a path
/// relative to the project root, as are all other source locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CasesConfig {
    pub(crate) url: String,
}

impl Default for CasesConfig {
    fn default() -> Self {
        Self {
            url: "https://covid.ourworldindata.org/data/owid-covid-data.csv"
                .into(),
        }
    }
}

/// Daily page views of a single article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PageviewsConfig {
    /// `{start}` and `{end}` are replaced by the reporting period
    /// (`YYYYMMDD`).
    pub(crate) url: String,
}

impl PageviewsConfig {
    pub(crate) fn location(&self, period: &Period) -> String {
        period.expand(&self.url, "%Y%m%d")
    }
}

impl Default for PageviewsConfig {
    fn default() -> Self {
        Self {
            url: "https://wikimedia.org/api/rest_v1/metrics/pageviews/\
                per-article/en.wikipedia/all-access/user/\
                COVID-19_pandemic/daily/{start}/{end}"
                .into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TrendsConfig {
    /// An export of the search-interest index. Google doesn't offer
    /// a public API, so this is usually a file in the project.
    pub(crate) url: String,

    /// Values below the reporting threshold count as zero.
    #[serde(default = "TrendsConfig::default_threshold")]
    pub(crate) threshold: f64,
}

impl TrendsConfig {
    fn default_threshold() -> f64 {
        1.0
    }
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            url: "trends.csv".into(),
            threshold: Self::default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PreprintsConfig {
    /// Endpoint of the details API; the page cursor is appended. A
    /// local location is read as a single snapshot page. `{start}` and
    /// `{end}` are replaced by the reporting period (`YYYY-MM-DD`).
    pub(crate) url: String,

    /// A preprint is kept if its title or abstract contains one of
    /// these terms (case-insensitive).
    #[serde(default = "PreprintsConfig::default_queries")]
    pub(crate) queries: Vec<String>,
}

impl PreprintsConfig {
    pub(crate) fn location(&self, period: &Period) -> String {
        period.expand(&self.url, "%Y-%m-%d")
    }

    fn default_queries() -> Vec<String> {
        ["coronavirus", "covid", "sars-cov-2", "2019-ncov", "pandemic"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}

impl Default for PreprintsConfig {
    fn default() -> Self {
        Self {
            url: "https://api.biorxiv.org/details/medrxiv/{start}/{end}"
                .into(),
            queries: Self::default_queries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WordsConfig {
    /// Domain-specific terms never shown in the word cloud.
    #[serde(default = "WordsConfig::default_excluded")]
    pub(crate) excluded: Vec<String>,

    /// Additional stopwords, one per line.
    pub(crate) stopwords: Option<PathBuf>,

    #[serde(default = "WordsConfig::default_max_words")]
    pub(crate) max_words: usize,

    #[serde(default = "WordsConfig::default_collocations")]
    pub(crate) collocations: bool,

    /// Minimum log-likelihood score of a collocation.
    #[serde(default = "WordsConfig::default_collocation_threshold")]
    pub(crate) collocation_threshold: f64,
}

impl WordsConfig {
    fn default_excluded() -> Vec<String> {
        [
            "covid",
            "covid19",
            "coronavirus",
            "sarscov2",
            "sars",
            "cov",
            "ncov",
            "2019ncov",
            "virus",
            "pandemic",
            "disease",
            "patient",
            "study",
            "result",
            "method",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    fn default_max_words() -> usize {
        200
    }

    fn default_collocations() -> bool {
        true
    }

    fn default_collocation_threshold() -> f64 {
        30.0
    }
}

impl Default for WordsConfig {
    fn default() -> Self {
        Self {
            excluded: Self::default_excluded(),
            stopwords: None,
            max_words: Self::default_max_words(),
            collocations: Self::default_collocations(),
            collocation_threshold: Self::default_collocation_threshold(),
        }
    }
}

/// The subset of the config that determines the derived tables. Word
/// cloud options only affect rendering and are left out.
#[derive(Serialize)]
struct CacheInputs<'a> {
    period: &'a Period,
    cases: &'a CasesConfig,
    trends: &'a TrendsConfig,
    pageviews: &'a PageviewsConfig,
    preprints: &'a PreprintsConfig,
    excluded: &'a [String],
    stopwords: Option<String>,
}

impl Config {
    /// Creates a new default config and sets the file location.
    pub(crate) fn create<P>(path: P) -> InfodemicResult<Self>
    where
        P: AsRef<Path>,
    {
        Ok(Self {
            path: path.as_ref().into(),
            ..Default::default()
        })
    }

    /// Loads an existing config from a path.
    pub(crate) fn from_path<P>(path: P) -> InfodemicResult<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().into();
        let content = fs::read_to_string(&path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.path = path;

        Ok(config)
    }

    /// Saves the config.
    pub(crate) fn save(&self) -> InfodemicResult<()> {
        let content = toml::to_string(self)?;
        let mut out = File::create(&self.path)?;
        out.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Returns the cache invalidation key.
    ///
    /// The key is the hex-encoded SHA256 digest of every option that
    /// influences the derived tables, including the contents of the
    /// stopword file (resolved against `base_dir`). Changing any of
    /// them makes an existing cache stale.
    pub(crate) fn cache_key(
        &self,
        base_dir: &Path,
    ) -> InfodemicResult<String> {
        let stopwords = self
            .words
            .stopwords
            .as_ref()
            .and_then(|path| fs::read_to_string(base_dir.join(path)).ok());

        let inputs = CacheInputs {
            period: &self.period,
            cases: &self.cases,
            trends: &self.trends,
            pageviews: &self.pageviews,
            preprints: &self.preprints,
            excluded: &self.words.excluded,
            stopwords,
        };

        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(&inputs)?);

        let hash = hasher.finalize();
        Ok(hash.iter().map(|b| format!("{b:02x}")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn default_config_roundtrip() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("infodemic.toml");

        let mut config = Config::create(&path)?;
        config.metadata.name = "report".into();
        config.save()?;

        let config = Config::from_path(&path)?;
        assert_eq!(config.metadata.name, "report");
        assert_eq!(config.period.start.to_string(), "2020-01-01");
        assert_eq!(config.trends.threshold, 1.0);
        assert!(config.words.excluded.contains(&"covid".to_string()));
        Ok(())
    }

    #[test]
    fn minimal_config_uses_defaults() -> TestResult {
        let config: Config = toml::from_str(
            "[metadata]\nname = \"x\"\nversion = \"1.0.0\"\n",
        )?;

        assert_eq!(config.cache.dir, PathBuf::from("cache"));
        assert_eq!(config.words.max_words, 200);
        assert!(config.cases.url.starts_with("https://"));
        Ok(())
    }

    #[test]
    fn cache_key_changes_with_inputs() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut config = Config::default();
        let key = config.cache_key(dir.path())?;
        assert_eq!(key.len(), 64);

        config.metadata.name = "renamed".into();
        assert_eq!(config.cache_key(dir.path())?, key);

        config.trends.threshold = 2.0;
        assert_ne!(config.cache_key(dir.path())?, key);
        Ok(())
    }

    #[test]
    fn cache_key_ignores_rendering_options() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut config = Config::default();
        let key = config.cache_key(dir.path())?;

        config.words.max_words = 10;
        config.words.collocations = false;
        config.words.collocation_threshold = 5.0;
        assert_eq!(config.cache_key(dir.path())?, key);

        config.words.excluded.push("vaccine".into());
        assert_ne!(config.cache_key(dir.path())?, key);
        Ok(())
    }

    #[test]
    fn cache_key_tracks_stopword_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("stop.txt");
        fs::write(&path, "mask\n")?;

        let config = Config {
            words: WordsConfig {
                stopwords: Some("stop.txt".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let key = config.cache_key(dir.path())?;
        assert_eq!(config.cache_key(dir.path())?, key);

        fs::write(&path, "mask\nschool\n")?;
        assert_ne!(config.cache_key(dir.path())?, key);
        Ok(())
    }

    #[test]
    fn locations_follow_period() {
        let period = Period {
            start: NaiveDate::from_ymd_opt(2019, 12, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2022, 6, 30).unwrap(),
        };

        let pageviews = PageviewsConfig::default().location(&period);
        assert!(pageviews.ends_with("/daily/20191201/20220630"));

        let preprints = PreprintsConfig::default().location(&period);
        assert!(preprints.ends_with("/medrxiv/2019-12-01/2022-06-30"));

        let snapshot = PreprintsConfig {
            url: "preprints.json".into(),
            queries: vec![],
        };
        assert_eq!(snapshot.location(&period), "preprints.json");
    }

    #[test]
    fn period_contains_bounds() {
        let period = Period::default();
        assert!(period.contains(&period.start));
        assert!(period.contains(&period.end));
        assert!(!period
            .contains(&NaiveDate::from_ymd_opt(2019, 12, 31).unwrap()));
    }
}
