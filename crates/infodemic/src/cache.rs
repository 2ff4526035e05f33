use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::pipeline::Tables;
use crate::prelude::*;

const KEY: &str = "KEY";
/// Cleaned tokens, one line of space-separated tokens per preprint.
const TOKENS: &str = "tokens.txt";

const CASES_GLOBAL: &str = "cases_global.ipc";
const CASES_CONTINENT: &str = "cases_continent.ipc";
const TRENDS: &str = "trends.ipc";
const PAGEVIEWS: &str = "pageviews.ipc";
const PREPRINTS: &str = "preprints.ipc";
const COMBINED: &str = "combined.ipc";

/// The artifacts of a complete cache, in the order they're written.
pub(crate) const ARTIFACTS: [&str; 8] = [
    CASES_GLOBAL,
    CASES_CONTINENT,
    TRENDS,
    PAGEVIEWS,
    PREPRINTS,
    COMBINED,
    TOKENS,
    KEY,
];

/// The state of the stored invalidation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyState {
    /// No key file; the cache predates invalidation keys or was filled
    /// by hand.
    Missing,
    Current,
    Stale,
}

/// A single cache artifact as reported by `status`.
#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) name: &'static str,
    pub(crate) rows: Option<usize>,
    pub(crate) size: Option<u64>,
}

/// On-disk snapshot of all derived tables.
pub(crate) struct Cache {
    dir: PathBuf,
    key: String,
}

fn read_table(path: &Path) -> InfodemicResult<DataFrame> {
    let file = File::open(path).map_err(|e| {
        InfodemicError::other(format!("{}: {e}", path.display()))
    })?;

    Ok(IpcReader::new(file).finish()?)
}

fn write_table(path: &Path, df: &mut DataFrame) -> InfodemicResult<()> {
    let mut writer = IpcWriter::new(File::create(path)?)
        .with_compression(Some(IpcCompression::ZSTD));
    writer.finish(df)?;
    Ok(())
}

impl Cache {
    pub(crate) fn new<P: Into<PathBuf>>(dir: P, key: String) -> Self {
        Self {
            dir: dir.into(),
            key,
        }
    }

    #[inline]
    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the key of the current config.
    #[inline]
    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    /// Returns `true` if the cache directory exists and isn't empty.
    /// The presence of any file counts as presence of all.
    pub(crate) fn is_populated(&self) -> bool {
        fs::read_dir(&self.dir)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }

    /// Returns the key the cache was built with, if any.
    pub(crate) fn stored_key(&self) -> InfodemicResult<Option<String>> {
        let path = self.dir.join(KEY);
        if !path.is_file() {
            return Ok(None);
        }

        Ok(Some(fs::read_to_string(path)?.trim().to_string()))
    }

    pub(crate) fn key_state(&self) -> InfodemicResult<KeyState> {
        Ok(match self.stored_key()? {
            None => KeyState::Missing,
            Some(key) if key == self.key => KeyState::Current,
            Some(_) => KeyState::Stale,
        })
    }

    /// Returns `true` if the tables can be loaded instead of rebuilt.
    pub(crate) fn is_valid(&self) -> InfodemicResult<bool> {
        Ok(self.is_populated() && self.key_state()? != KeyState::Stale)
    }

    pub(crate) fn create(&self) -> InfodemicResult<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Removes the cache directory and all its contents.
    pub(crate) fn clear(&self) -> InfodemicResult<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }

        Ok(())
    }

    /// Loads all derived tables verbatim.
    pub(crate) fn load(&self) -> InfodemicResult<Tables> {
        let path = self.dir.join(TOKENS);
        let file = File::open(&path).map_err(|e| {
            InfodemicError::other(format!("{}: {e}", path.display()))
        })?;

        let tokens = BufReader::new(file)
            .lines()
            .filter_map(|line| match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(Ok(line
                    .split_whitespace()
                    .map(String::from)
                    .collect::<Vec<_>>())),
                Err(e) => Some(Err(e)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Tables {
            cases_global: read_table(&self.dir.join(CASES_GLOBAL))?,
            cases_continent: read_table(&self.dir.join(CASES_CONTINENT))?,
            trends: read_table(&self.dir.join(TRENDS))?,
            pageviews: read_table(&self.dir.join(PAGEVIEWS))?,
            preprints: read_table(&self.dir.join(PREPRINTS))?,
            combined: read_table(&self.dir.join(COMBINED))?,
            tokens,
        })
    }

    /// Persists all derived tables. The key is written last, so an
    /// interrupted write never leaves a cache that looks current.
    pub(crate) fn store(&self, tables: &mut Tables) -> InfodemicResult<()> {
        self.create()?;

        write_table(&self.dir.join(CASES_GLOBAL), &mut tables.cases_global)?;
        write_table(
            &self.dir.join(CASES_CONTINENT),
            &mut tables.cases_continent,
        )?;
        write_table(&self.dir.join(TRENDS), &mut tables.trends)?;
        write_table(&self.dir.join(PAGEVIEWS), &mut tables.pageviews)?;
        write_table(&self.dir.join(PREPRINTS), &mut tables.preprints)?;
        write_table(&self.dir.join(COMBINED), &mut tables.combined)?;

        let mut out = BufWriter::new(File::create(self.dir.join(TOKENS))?);
        for tokens in tables.tokens.iter() {
            writeln!(out, "{}", tokens.join(" "))?;
        }
        out.flush()?;

        fs::write(self.dir.join(KEY), format!("{}\n", self.key))?;
        log::debug!("stored tables in {}", self.dir.display());
        Ok(())
    }

    /// Lists the expected artifacts with their number of rows and
    /// size. Missing artifacts have neither.
    pub(crate) fn entries(&self) -> InfodemicResult<Vec<Entry>> {
        ARTIFACTS
            .into_iter()
            .map(|name| {
                let path = self.dir.join(name);
                let Ok(metadata) = fs::metadata(&path) else {
                    return Ok(Entry {
                        name,
                        rows: None,
                        size: None,
                    });
                };

                let rows = match name {
                    KEY => None,
                    TOKENS => Some(fs::read_to_string(&path)?.lines().count()),
                    _ => Some(read_table(&path)?.height()),
                };

                Ok(Entry {
                    name,
                    rows,
                    size: Some(metadata.len()),
                })
            })
            .collect()
    }
}
