use clap::Parser;

use crate::pipeline;
use crate::prelude::*;

/// Fetch all sources and populate the cache.
///
/// An existing cache built with the current config is kept as is.
#[derive(Debug, Default, Parser)]
pub(crate) struct Fetch {
    /// Rebuild the cache even if it is up to date.
    #[arg(short, long)]
    force: bool,

    /// Run verbosely. Print additional progress information to the
    /// standard error stream. This option conflicts with the
    /// `--quiet` option.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Operate quietly; do not show progress. This option conflicts
    /// with the `--verbose` option.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Fetch {
    pub(crate) fn execute(self) -> InfodemicResult<()> {
        let project = Project::discover()?;
        let config = project.config()?;

        let tables =
            pipeline::load_or_build(&project, &config, self.quiet, self.force)?;

        if self.verbose {
            eprintln!(
                "{} combined rows, {} preprint months, {} tokens.",
                tables.combined.height(),
                tables.preprints.height(),
                tables.tokens.iter().map(Vec::len).sum::<usize>()
            );
        }

        Ok(())
    }
}
