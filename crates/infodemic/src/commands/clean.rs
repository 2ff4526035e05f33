use clap::Parser;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;

use crate::prelude::*;

/// Delete the cache.
///
/// The next `fetch` or `render` fetches all sources again.
#[derive(Debug, Default, Parser)]
pub(crate) struct Clean {
    /// Don't ask for confirmation.
    #[arg(short, long)]
    yes: bool,

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

impl Clean {
    pub(crate) fn execute(self) -> InfodemicResult<()> {
        let project = Project::discover()?;
        let config = project.config()?;
        let cache = project.cache(&config)?;

        if !cache.dir().exists() {
            if self.verbose {
                eprintln!("Nothing to clean.");
            }

            return Ok(());
        }

        let confirm = self.yes
            || Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(format!(
                    "Delete cache {}?",
                    cache.dir().display()
                ))
                .default(true)
                .show_default(true)
                .interact()
                .map_err(InfodemicError::other)?;

        if confirm {
            cache.clear()?;

            if self.verbose {
                eprintln!("Deleted {}.", cache.dir().display());
            }
        }

        Ok(())
    }
}
