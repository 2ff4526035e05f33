use std::path::PathBuf;

use clap::Parser;

use crate::prelude::*;
use crate::{pipeline, report};

/// Render the report.
///
/// Tables are loaded from the cache; a missing or stale cache is
/// rebuilt first.
#[derive(Debug, Default, Parser)]
pub(crate) struct Render {
    /// Run verbosely. Print additional progress information to the
    /// standard error stream. This option conflicts with the
    /// `--quiet` option.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Operate quietly; do not show progress. This option conflicts
    /// with the `--verbose` option.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write the report into `filename`. By default the report is
    /// written to `report.html` in the output directory.
    #[arg(short, long, value_name = "filename")]
    output: Option<PathBuf>,
}

impl Render {
    pub(crate) fn execute(self) -> InfodemicResult<()> {
        let project = Project::discover()?;
        let config = project.config()?;

        let tables =
            pipeline::load_or_build(&project, &config, self.quiet, false)?;
        let rendered = report::render(&config, &tables)?;

        let path = self.output.unwrap_or_else(|| {
            project.output_dir(&config).join(Project::REPORT)
        });

        let path = report::write(&rendered, &path)?;
        log::info!("report written to {}", path.display());

        if self.verbose {
            eprintln!(
                "{} bytes of HTML, {} bytes of SVG.",
                rendered.html.len(),
                rendered.wordcloud.len()
            );
        }

        Ok(())
    }
}
