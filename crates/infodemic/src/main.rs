use std::io::ErrorKind;
use std::process;

use clap::Parser;
use cli::{Args, Command};
use error::{InfodemicError, InfodemicResult};
#[cfg(not(target_env = "msvc"))]
use jemallocator::Jemalloc;
use polars::error::PolarsError;
use project::Project;
use rayon::ThreadPoolBuilder;

pub(crate) mod prelude {
    pub(crate) use crate::config::{Config, Runtime};
    pub(crate) use crate::error::{bail, InfodemicError, InfodemicResult};
    pub(crate) use crate::progress::ProgressBarBuilder;
    pub(crate) use crate::project::Project;
}

mod cache;
mod chart;
mod cli;
mod commands;
mod config;
mod error;
mod fetch;
mod month;
mod pipeline;
mod progress;
mod project;
mod report;
mod rescale;
mod sources;
mod text;
mod utils;
mod wordcloud;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn num_threads(args: &Args) -> usize {
    if let Some(num_threads) = args.num_jobs {
        return num_threads;
    }

    if let Ok(config) = Project::discover().and_then(|p| p.config()) {
        if let Some(runtime) = config.runtime {
            if let Some(num_threads) = runtime.num_jobs {
                return num_threads;
            }
        }
    }

    0
}

fn run(args: Args) -> InfodemicResult<()> {
    match args.cmd {
        Command::Clean(cmd) => cmd.execute(),
        Command::Completions(cmd) => cmd.execute(),
        Command::Config(cmd) => cmd.execute(),
        Command::Fetch(cmd) => cmd.execute(),
        Command::Init(cmd) => cmd.execute(),
        Command::Render(cmd) => cmd.execute(),
        Command::Status(cmd) => cmd.execute(),
        Command::Words(cmd) => cmd.execute(),
    }
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(num_threads(&args))
        .build_global()
    {
        eprintln!("error: {e:#}");
        process::exit(1);
    }

    match run(args) {
        Ok(()) => process::exit(0),
        Err(InfodemicError::IO(e)) if e.kind() == ErrorKind::BrokenPipe => {
            process::exit(0)
        }
        Err(InfodemicError::Polars(PolarsError::IO { error, .. }))
            if error.kind() == ErrorKind::BrokenPipe =>
        {
            process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}
