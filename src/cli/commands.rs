//! Command implementations for `cot-decode`. Each returns a process exit code.

use std::path::Path;

use super::args::{ConfigCommand, DecodeOptions};
use super::output_format::print_candidate_table;
use super::{EXIT_CONFIG_ERROR, EXIT_CONNECTION_ERROR, EXIT_FAILURE, EXIT_SUCCESS};
use crate::backend::OllamaClient;
use crate::config::{ConfigError, ConfigOverrides, DecodingConfig, ProcessEnv};
use crate::engine::{Conversation, SelectionResult};
use crate::pipeline::{DecodeError, Pipeline, PIPELINE_NAME};

/// Config file (if any) first, command-line flags on top.
pub fn build_overrides(options: &DecodeOptions) -> Result<ConfigOverrides, ConfigError> {
    let file = match &options.config_file {
        Some(path) => ConfigOverrides::load_file(path)?,
        None => ConfigOverrides::default(),
    };
    Ok(file.merge(options.overrides.clone()))
}

pub fn load_conversation(path: &Path) -> Result<Conversation, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid conversation file {}: {}", path.display(), e))
}

pub async fn run_ask(prompt: &str, options: &DecodeOptions) -> i32 {
    run_decode(&Conversation::single(prompt), options).await
}

pub async fn run_chat(file: &Path, options: &DecodeOptions) -> i32 {
    match load_conversation(file) {
        Ok(conversation) => run_decode(&conversation, options).await,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_CONFIG_ERROR
        }
    }
}

async fn run_decode(conversation: &Conversation, options: &DecodeOptions) -> i32 {
    let (overrides, config) = match resolve(options) {
        Ok(pair) => pair,
        Err(code) => return code,
    };
    let client = match OllamaClient::new(config.backend_url.clone(), config.request_timeout_ms) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONNECTION_ERROR;
        }
    };

    let pipeline = Pipeline::new(client, overrides);
    pipeline.on_startup().await;
    let result = pipeline.pipe(PIPELINE_NAME, conversation).await;
    pipeline.on_shutdown().await;

    match result {
        Ok(outcome) => {
            if options.json {
                match serde_json::to_string_pretty(&outcome) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error encoding output: {}", e);
                        return EXIT_FAILURE;
                    }
                }
            } else {
                println!("{}", outcome.render());
            }
            if options.table {
                print_candidate_table(&outcome.selection);
            }
            EXIT_SUCCESS
        }
        Err(DecodeError::Config(e)) => {
            eprintln!("Configuration error: {}", e);
            EXIT_CONFIG_ERROR
        }
        Err(e @ DecodeError::TotalFailure { .. }) => {
            println!("{}", e.render());
            let DecodeError::TotalFailure { selection, .. } = &e else {
                return EXIT_FAILURE;
            };
            if options.table {
                print_candidate_table(selection);
            }
            total_failure_exit_code(selection)
        }
    }
}

/// Exit code for a batch with no winner.
pub(crate) fn total_failure_exit_code(selection: &SelectionResult) -> i32 {
    if selection.is_backend_unreachable() {
        EXIT_CONNECTION_ERROR
    } else {
        EXIT_FAILURE
    }
}

fn resolve(options: &DecodeOptions) -> Result<(ConfigOverrides, DecodingConfig), i32> {
    let overrides = build_overrides(options).map_err(|e| {
        eprintln!("Configuration error: {}", e);
        EXIT_CONFIG_ERROR
    })?;
    let config = DecodingConfig::resolve(&overrides, &ProcessEnv).map_err(|e| {
        eprintln!("Configuration error: {}", e);
        EXIT_CONFIG_ERROR
    })?;
    Ok((overrides, config))
}

pub fn run_config(command: ConfigCommand, options: &DecodeOptions) -> i32 {
    match command {
        ConfigCommand::Defaults => print_config(&DecodingConfig::default(), options.json),
        ConfigCommand::Show => match resolve(options) {
            Ok((_, config)) => print_config(&config, options.json),
            Err(code) => code,
        },
        ConfigCommand::Validate => match resolve(options) {
            Ok(_) => {
                println!("Configuration is valid");
                EXIT_SUCCESS
            }
            Err(code) => code,
        },
    }
}

fn print_config(config: &DecodingConfig, json: bool) -> i32 {
    let rendered = if json {
        serde_json::to_string_pretty(config).map_err(|e| e.to_string())
    } else {
        toml::to_string_pretty(config).map_err(|e| e.to_string())
    };
    match rendered {
        Ok(text) => {
            println!("{}", text);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error encoding configuration: {}", e);
            EXIT_FAILURE
        }
    }
}

/// Probe the backend. The model is not required for this command.
pub async fn run_health(options: &DecodeOptions) -> i32 {
    let overrides = match build_overrides(options) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };
    let probe = ConfigOverrides {
        model: Some(overrides.model.clone().unwrap_or_else(|| "health-probe".to_string())),
        ..overrides
    };
    let config = match DecodingConfig::resolve(&probe, &ProcessEnv) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    let client = match OllamaClient::new(config.backend_url.clone(), config.request_timeout_ms) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONNECTION_ERROR;
        }
    };
    match client.health_check().await {
        Ok(true) => {
            println!("Backend at {} is healthy", client.base_url());
            EXIT_SUCCESS
        }
        Ok(false) => {
            println!("Backend at {} is unhealthy", client.base_url());
            EXIT_FAILURE
        }
        Err(e) => {
            eprintln!("Connection error: {}", e);
            EXIT_CONNECTION_ERROR
        }
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
