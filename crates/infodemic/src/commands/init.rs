use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::{env, fs, process};

use clap::{Parser, ValueEnum};
use semver::Version;

use crate::prelude::*;

/// Initialize a new or re-initialize an existing report project.
#[derive(Debug, Parser)]
pub(crate) struct Init {
    /// The name of the report.
    #[arg(short, long)]
    name: Option<String>,

    /// The version of the report.
    #[arg(long, default_value = "0.1.0")]
    version: Version,

    /// The headline of the rendered document.
    #[arg(short, long)]
    title: Option<String>,

    /// A short blurb about the report.
    #[arg(short, long)]
    description: Option<String>,

    /// A list of people or organizations, which are considered as the
    /// authors of the report. By default the list is populated with
    /// the git identity (if available).
    #[arg(short, long = "author")]
    authors: Vec<String>,

    /// Initialize the project for the given version control system
    /// (VCS).
    #[arg(long, default_value = "git")]
    vcs: Vcs,

    /// Whether to overwrite config with default values or not.
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

    /// The location of the project.
    #[arg(default_value = ".")]
    path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, ValueEnum)]
enum Vcs {
    Git,
    None,
}

/// Ignores the derived artifacts of the default config.
fn gitignore(config: &Config) -> String {
    format!(
        "# infodemic\n/{}\n/{}\n",
        config.cache.dir.display(),
        config.output.dir.display()
    )
}

#[inline]
fn is_inside_git_work_tree(path: &Path) -> bool {
    process::Command::new("git")
        .arg("rev-parse")
        .arg("--is-inside-work-tree")
        .current_dir(path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[inline]
fn git_init(path: &Path) -> bool {
    process::Command::new("git")
        .arg("init")
        .current_dir(path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn git_config(path: &Path, key: &str) -> Option<String> {
    let output = process::Command::new("git")
        .arg("config")
        .arg("--get")
        .arg(key)
        .current_dir(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .ok()?;

    let value = std::str::from_utf8(&output.stdout).ok()?.trim_end();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn git_user(path: &Path) -> Option<String> {
    let name = git_config(path, "user.name")?;
    match git_config(path, "user.email") {
        Some(email) => Some(format!("{name} <{email}>")),
        None => Some(name),
    }
}

impl Init {
    pub(crate) fn execute(mut self) -> InfodemicResult<()> {
        let root_dir = env::current_dir()?.join(&self.path);
        let config_path = root_dir.join(Project::CONFIG);

        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;

            if self.verbose {
                eprintln!(
                    "Initialize new report project in {}",
                    root_dir.display()
                );
            }
        } else if self.verbose {
            eprintln!(
                "Re-Initialize existing report project in {}",
                root_dir.display()
            );
        }

        if config_path.exists() && !self.force {
            if !self.quiet {
                eprintln!(
                    "Keep existing config {} (use --force to overwrite).",
                    config_path.display()
                );
            }

            return Ok(());
        }

        if self.authors.is_empty() && self.vcs == Vcs::Git {
            if let Some(author) = git_user(&root_dir) {
                if self.verbose {
                    eprintln!("Set authors to Git identity '{author}'.");
                }

                self.authors.push(author)
            }
        }

        let mut config = Config::create(&config_path)?;
        config.metadata.description = self.description;
        config.metadata.authors = self.authors;
        config.metadata.version = self.version;
        config.metadata.name = self.name.unwrap_or(
            root_dir
                .file_name()
                .and_then(OsStr::to_str)
                .unwrap_or_default()
                .to_string(),
        );

        if let Some(title) = self.title {
            config.metadata.title = title;
        }

        if self.vcs == Vcs::Git {
            if !is_inside_git_work_tree(&root_dir) && !git_init(&root_dir)
            {
                bail!("Failed to initialize Git repository");
            }

            if !root_dir.join(".gitignore").is_file() {
                fs::write(root_dir.join(".gitignore"), gitignore(&config))?;
            }
        }

        config.save()?;

        if !root_dir.join(&config.trends.url).exists() && !self.quiet {
            eprintln!(
                "Place a search-interest export at {} before fetching.",
                root_dir.join(&config.trends.url).display()
            );
        }

        Ok(())
    }
}
