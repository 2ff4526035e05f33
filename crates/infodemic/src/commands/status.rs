use std::env::current_dir;

use clap::Parser;
use comfy_table::{presets, Row, Table};
use humansize::{make_format, BINARY};

use crate::cache::KeyState;
use crate::prelude::*;
use crate::utils::relpath;

/// Show the state of the cache.
#[derive(Debug, Default, Parser)]
pub(crate) struct Status {
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

impl Status {
    pub(crate) fn execute(self) -> InfodemicResult<()> {
        let project = Project::discover()?;
        let config = project.config()?;
        let cache = project.cache(&config)?;
        let cache_dir = relpath(cache.dir(), current_dir()?);

        eprintln!(
            "report '{}', version {}.\n",
            config.metadata.name, config.metadata.version
        );

        if !cache.is_populated() {
            println!("Cache {cache_dir} is empty; run `fetch` to fill it.");
            return Ok(());
        }

        let formatter = make_format(BINARY);

        let mut table = Table::new();
        table.set_header(Row::from(vec!["artifact", "rows", "size"]));
        table.load_preset(presets::UTF8_FULL_CONDENSED);

        for entry in cache.entries()? {
            let (rows, size) = match (entry.rows, entry.size) {
                (_, None) => ("missing".to_string(), "".to_string()),
                (Some(rows), Some(size)) => {
                    (rows.to_string(), formatter(size))
                }
                (None, Some(size)) => ("".to_string(), formatter(size)),
            };

            table.add_row(vec![entry.name.to_string(), rows, size]);
        }

        eprintln!("Cache {cache_dir}:\n{table}");

        match cache.key_state()? {
            KeyState::Current => {
                println!("OK, cache is up to date.");
            }
            KeyState::Missing => {
                println!("Cache has no key; it is used as is.");
            }
            KeyState::Stale => {
                println!(
                    "Cache is stale (config changed); it is rebuilt on \
                        the next run."
                );
            }
        }

        if self.verbose {
            eprintln!("key: {}", cache.key());
        }

        Ok(())
    }
}
