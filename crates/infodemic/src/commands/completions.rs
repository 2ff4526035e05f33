use std::fs::File;
use std::io::{stdout, Write};
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Args;
use crate::prelude::*;

/// Generate completion scripts for various shells.
#[derive(Debug, clap::Parser)]
pub(crate) struct Completions {
    /// Write output to `filename` instead of `stdout`.
    #[arg(long, short, value_name = "filename")]
    output: Option<PathBuf>,

    /// Shell for which a completion script is to be generated.
    #[arg(value_name = "shell")]
    shell: Shell,
}

impl Completions {
    pub(crate) fn execute(self) -> InfodemicResult<()> {
        let mut cmd = Args::command();
        let mut wtr: Box<dyn Write> = match self.output {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(stdout().lock()),
        };

        generate(self.shell, &mut cmd, env!("CARGO_PKG_NAME"), &mut wtr);
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn write_bash_completions() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("infodemic.bash");

        Completions {
            output: Some(path.clone()),
            shell: Shell::Bash,
        }
        .execute()?;

        let script = std::fs::read_to_string(path)?;
        assert!(script.contains("infodemic"));
        assert!(script.contains("render"));
        Ok(())
    }
}
