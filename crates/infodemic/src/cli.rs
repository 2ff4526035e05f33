use clap::{Parser, Subcommand};

use crate::commands::*;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None, max_term_width = 72)]
pub(crate) struct Args {
    /// Number of threads to use. If this options isn't set or a value
    /// of "0" is chosen, the maximum number of available threads
    /// is used.
    #[clap(
        short = 'j',
        long,
        env = "INFODEMIC_NUM_JOBS",
        hide_env_values = true
    )]
    pub(crate) num_jobs: Option<usize>,

    #[command(subcommand)]
    pub(crate) cmd: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    Clean(Clean),
    Completions(Completions),
    Config(Config),
    Fetch(Fetch),
    #[clap(alias = "new")]
    Init(Init),
    Render(Render),
    Status(Status),
    Words(Words),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn parse_global_jobs() {
        let args = Args::try_parse_from(["infodemic", "-j", "4", "status"])
            .unwrap();
        assert_eq!(args.num_jobs, Some(4));
        assert!(matches!(args.cmd, Command::Status(_)));

        let args = Args::try_parse_from(["infodemic", "new", "report"])
            .unwrap();
        assert!(matches!(args.cmd, Command::Init(_)));
    }
}
