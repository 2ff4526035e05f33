use std::str::FromStr;

use chrono::NaiveDate;
use clap::Parser;

use crate::config::Config as ProjectConfig;
use crate::prelude::*;

const OPTIONS: &[&str] = &[
    "runtime.num_jobs",
    "metadata.title",
    "metadata.description",
    "period.start",
    "period.end",
    "cache.dir",
    "output.dir",
    "trends.threshold",
    "words.max_words",
    "words.collocations",
    "words.collocation_threshold",
];

/// Get and set report config options.
#[derive(Debug, Parser)]
pub(crate) struct Config {
    /// Get the value for the given key.
    #[arg(long, conflicts_with_all = ["value", "unset", "set"])]
    get: bool,

    /// Remove the key from the config.
    #[arg(long, conflicts_with_all = ["value", "get", "set"])]
    unset: bool,

    /// Set the value for the given key.
    #[arg(long, requires = "value", conflicts_with_all = ["get", "unset"])]
    set: bool,

    /// The name of the config option.
    name: String,

    /// The (new) value of the config option.
    #[arg(conflicts_with_all = ["get", "unset"])]
    value: Option<String>,
}

#[inline]
fn print_option<T>(key: &str, value: Option<T>)
where
    T: ToString,
{
    println!(
        "{key} = {}",
        match value {
            Some(value) => value.to_string(),
            None => "None".to_string(),
        }
    );
}

fn parse<T: FromStr>(value: &str) -> InfodemicResult<T> {
    value
        .parse::<T>()
        .map_err(|_| InfodemicError::other(format!("invalid value `{value}`")))
}

fn get(config: &ProjectConfig, name: &str) -> Option<String> {
    match name {
        "runtime.num_jobs" => config
            .runtime
            .as_ref()
            .and_then(|rt| rt.num_jobs)
            .map(|n| n.to_string()),
        "metadata.title" => Some(config.metadata.title.clone()),
        "metadata.description" => config.metadata.description.clone(),
        "period.start" => Some(config.period.start.to_string()),
        "period.end" => Some(config.period.end.to_string()),
        "cache.dir" => Some(config.cache.dir.display().to_string()),
        "output.dir" => Some(config.output.dir.display().to_string()),
        "trends.threshold" => Some(config.trends.threshold.to_string()),
        "words.max_words" => Some(config.words.max_words.to_string()),
        "words.collocations" => Some(config.words.collocations.to_string()),
        "words.collocation_threshold" => {
            Some(config.words.collocation_threshold.to_string())
        }
        _ => None,
    }
}

fn set(
    config: &mut ProjectConfig,
    name: &str,
    value: &str,
) -> InfodemicResult<()> {
    match name {
        "runtime.num_jobs" => {
            let value = parse::<usize>(value)?;
            if let Some(ref mut runtime) = config.runtime {
                runtime.num_jobs = Some(value);
            } else {
                config.runtime = Some(Runtime {
                    num_jobs: Some(value),
                });
            }
        }
        "metadata.title" => config.metadata.title = value.into(),
        "metadata.description" => {
            config.metadata.description = Some(value.into())
        }
        "period.start" => config.period.start = parse::<NaiveDate>(value)?,
        "period.end" => config.period.end = parse::<NaiveDate>(value)?,
        "cache.dir" => config.cache.dir = value.into(),
        "output.dir" => config.output.dir = value.into(),
        "trends.threshold" => config.trends.threshold = parse(value)?,
        "words.max_words" => config.words.max_words = parse(value)?,
        "words.collocations" => config.words.collocations = parse(value)?,
        "words.collocation_threshold" => {
            config.words.collocation_threshold = parse(value)?
        }
        _ => unreachable!(),
    }

    if config.period.start > config.period.end {
        bail!("period start must not be after its end");
    }

    Ok(())
}

/// Resets an option to its default value.
fn unset(config: &mut ProjectConfig, name: &str) {
    let defaults = ProjectConfig::default();

    match name {
        "runtime.num_jobs" => config.runtime = None,
        "metadata.title" => config.metadata.title = defaults.metadata.title,
        "metadata.description" => config.metadata.description = None,
        "period.start" => config.period.start = defaults.period.start,
        "period.end" => config.period.end = defaults.period.end,
        "cache.dir" => config.cache = defaults.cache,
        "output.dir" => config.output = defaults.output,
        "trends.threshold" => {
            config.trends.threshold = defaults.trends.threshold
        }
        "words.max_words" => {
            config.words.max_words = defaults.words.max_words
        }
        "words.collocations" => {
            config.words.collocations = defaults.words.collocations
        }
        "words.collocation_threshold" => {
            config.words.collocation_threshold =
                defaults.words.collocation_threshold
        }
        _ => unreachable!(),
    }
}

impl Config {
    pub(crate) fn execute(self) -> InfodemicResult<()> {
        let project = Project::discover()?;
        let mut config = project.config()?;

        let name = match self.name.as_str() {
            name if OPTIONS.contains(&name) => name,
            name => {
                bail!("unknown config option `{name}`");
            }
        };

        if let Some(ref value) = self.value {
            set(&mut config, name, value)?;
            config.save()?;
        } else if self.unset {
            unset(&mut config, name);
            config.save()?;
        } else if self.get || !self.set {
            print_option(name, get(&config, name));
        } else {
            unreachable!()
        }

        Ok(())
    }
}
