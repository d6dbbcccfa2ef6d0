//! Command-line argument parsing for `cot-decode`.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigOverrides;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
    #[error("Missing value for {0}")]
    MissingValue(String),
    #[error("Invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },
    #[error("Missing required option {0}")]
    MissingRequired(&'static str),
}

/// Options shared by every command that resolves a configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeOptions {
    pub config_file: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    /// Print machine-readable JSON instead of text.
    pub json: bool,
    /// Print a per-candidate table after the answer.
    pub table: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    Show,
    Defaults,
    Validate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ask { prompt: String, options: DecodeOptions },
    Chat { file: PathBuf, options: DecodeOptions },
    Config { command: ConfigCommand, options: DecodeOptions },
    Health { options: DecodeOptions },
    Help(Option<String>),
    Version,
}

/// Parse `args` as passed to `main` (program name at index 0).
pub fn parse_args(args: &[String]) -> Result<Command, ArgError> {
    let command = args.get(1).map(String::as_str).unwrap_or("help");
    let rest = args.get(2..).unwrap_or(&[]);

    match command {
        "ask" => {
            let (options, extra) = parse_options(rest, &["--prompt"])?;
            let prompt = extra.get("--prompt").cloned().ok_or(ArgError::MissingRequired("--prompt"))?;
            Ok(Command::Ask { prompt, options })
        }
        "chat" => {
            let (options, extra) = parse_options(rest, &["--file"])?;
            let file = extra.get("--file").cloned().ok_or(ArgError::MissingRequired("--file"))?;
            Ok(Command::Chat { file: PathBuf::from(file), options })
        }
        "config" => {
            let (sub, rest) = match rest.first().map(String::as_str) {
                Some(s) if !s.starts_with("--") => (s, &rest[1..]),
                _ => ("show", rest),
            };
            let command = match sub {
                "show" => ConfigCommand::Show,
                "defaults" => ConfigCommand::Defaults,
                "validate" => ConfigCommand::Validate,
                other => return Err(ArgError::UnknownCommand(format!("config {}", other))),
            };
            let (options, _) = parse_options(rest, &[])?;
            Ok(Command::Config { command, options })
        }
        "health" => {
            let (options, _) = parse_options(rest, &[])?;
            Ok(Command::Health { options })
        }
        "help" | "--help" | "-h" => Ok(Command::Help(rest.first().cloned())),
        "version" | "--version" | "-V" => Ok(Command::Version),
        other => Err(ArgError::UnknownCommand(other.to_string())),
    }
}

type Extra = std::collections::HashMap<&'static str, String>;

const VALUE_FLAGS: [&str; 8] = [
    "--config",
    "--model",
    "--url",
    "--k",
    "--temperature",
    "--max-tokens",
    "--timeout-ms",
    "--concurrency",
];

fn parse_options(args: &[String], extra_flags: &[&'static str]) -> Result<(DecodeOptions, Extra), ArgError> {
    let mut options = DecodeOptions::default();
    let mut extra = Extra::new();
    let mut i = 0;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--json" => options.json = true,
            "--table" => options.table = true,
            "--debug" => options.overrides.debug = Some(true),
            "--no-debug" => options.overrides.debug = Some(false),
            _ => {
                if !VALUE_FLAGS.contains(&flag) && !extra_flags.contains(&flag) {
                    return Err(ArgError::UnknownArgument(flag.to_string()));
                }
                let value = args.get(i + 1).ok_or_else(|| ArgError::MissingValue(flag.to_string()))?;
                match flag {
                    "--config" => options.config_file = Some(PathBuf::from(value)),
                    "--model" => options.overrides.model = Some(value.clone()),
                    "--url" => options.overrides.backend_url = Some(value.clone()),
                    "--k" => options.overrides.k = Some(parse_value(flag, value)?),
                    "--temperature" => options.overrides.temperature = Some(parse_value(flag, value)?),
                    "--max-tokens" => options.overrides.max_tokens = Some(parse_value(flag, value)?),
                    "--timeout-ms" => options.overrides.request_timeout_ms = Some(parse_value(flag, value)?),
                    "--concurrency" => options.overrides.max_concurrency = Some(parse_value(flag, value)?),
                    _ => match extra_flags.iter().find(|f| **f == flag) {
                        Some(known) => {
                            extra.insert(*known, value.clone());
                        }
                        None => return Err(ArgError::UnknownArgument(flag.to_string())),
                    },
                }
                i += 1;
            }
        }
        i += 1;
    }
    Ok((options, extra))
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, ArgError> {
    value.parse().map_err(|_| ArgError::InvalidValue { flag: flag.to_string(), value: value.to_string() })
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
