use std::fs::File;
use std::io::stdout;
use std::path::{Path, PathBuf};

use clap::Parser;
use polars::prelude::*;

use crate::pipeline;
use crate::prelude::*;
use crate::wordcloud::{self, Term};

/// Print the term frequencies behind the word cloud.
#[derive(Debug, Default, Parser)]
pub(crate) struct Words {
    /// Run verbosely. Print additional progress information to the
    /// standard error stream. This option conflicts with the
    /// `--quiet` option.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Operate quietly; do not show progress. This option conflicts
    /// with the `--verbose` option.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print only the `n` most frequent terms.
    #[arg(short = 'n', long, value_name = "n")]
    limit: Option<usize>,

    /// Write the table into `filename`. Files ending in `.ipc` are
    /// written in Arrow IPC format, all others in CSV format. By
    /// default output will be written in CSV format to the standard
    /// output (`stdout`).
    #[arg(short, long, value_name = "filename")]
    output: Option<PathBuf>,
}

fn to_dataframe(terms: &[Term]) -> InfodemicResult<DataFrame> {
    let term: Vec<&str> = terms.iter().map(|t| t.text.as_str()).collect();
    let count: Vec<u64> = terms.iter().map(|t| t.count).collect();

    Ok(DataFrame::new(vec![
        Series::new("term", term),
        Series::new("count", count),
    ])?)
}

#[inline]
fn is_ipc(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "ipc")
}

impl Words {
    pub(crate) fn execute(self) -> InfodemicResult<()> {
        let project = Project::discover()?;
        let config = project.config()?;

        let tables =
            pipeline::load_or_build(&project, &config, self.quiet, false)?;

        let mut terms = wordcloud::terms(&tables.tokens, &config.words);
        if let Some(limit) = self.limit {
            terms.truncate(limit);
        }

        if self.verbose {
            eprintln!(
                "{} terms from {} tokens.",
                terms.len(),
                tables.tokens.iter().map(Vec::len).sum::<usize>()
            );
        }

        let mut df = to_dataframe(&terms)?;

        match self.output {
            Some(path) if is_ipc(&path) => {
                let mut writer = IpcWriter::new(File::create(path)?)
                    .with_compression(Some(IpcCompression::ZSTD));
                writer.finish(&mut df)?;
            }
            Some(path) => {
                let mut writer = CsvWriter::new(File::create(path)?);
                writer.finish(&mut df)?;
            }
            None => {
                let mut writer = CsvWriter::new(stdout().lock());
                writer.finish(&mut df)?;
            }
        }

        Ok(())
    }
}
