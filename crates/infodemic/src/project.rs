use std::path::PathBuf;
use std::{env, fs};

use crate::cache::Cache;
use crate::config::Config;
use crate::error::{InfodemicError, InfodemicResult};

pub(crate) struct Project {
    /// The root directory of the report project.
    root_dir: PathBuf,
}

impl Project {
    pub(crate) const CONFIG: &'static str = "infodemic.toml";
    pub(crate) const REPORT: &'static str = "report.html";
    pub(crate) const WORDCLOUD: &'static str = "wordcloud.svg";

    /// Discovers the root of the project.
    ///
    /// This function fails, if neither the current directory nor any
    /// parent directory contains a project [Config].
    pub(crate) fn discover() -> InfodemicResult<Self> {
        let mut root_dir = env::current_dir()?;

        loop {
            if let Ok(metadata) =
                fs::metadata(root_dir.join(Self::CONFIG))
            {
                if metadata.is_file() {
                    break;
                }
            }

            if !root_dir.pop() {
                return Err(InfodemicError::Other(
                    "not an infodemic project (or any parent directory)"
                        .into(),
                ));
            }
        }

        Ok(Self::at(root_dir))
    }

    /// Opens the project rooted at `root_dir` without discovery.
    #[inline]
    pub(crate) fn at<P: Into<PathBuf>>(root_dir: P) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Returns the config associated with the project.
    #[inline]
    pub(crate) fn config(&self) -> InfodemicResult<Config> {
        Config::from_path(self.root_dir.join(Self::CONFIG))
    }

    /// Returns the base directory of the project.
    #[inline]
    pub(crate) fn base_dir(&self) -> &PathBuf {
        &self.root_dir
    }

    /// Returns the cache of derived tables.
    pub(crate) fn cache(&self, config: &Config) -> InfodemicResult<Cache> {
        Ok(Cache::new(
            self.root_dir.join(&config.cache.dir),
            config.cache_key(&self.root_dir)?,
        ))
    }

    /// Returns the directory the report is rendered into.
    #[inline]
    pub(crate) fn output_dir(&self, config: &Config) -> PathBuf {
        self.root_dir.join(&config.output.dir)
    }
}
