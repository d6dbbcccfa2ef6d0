//! cot-decode entry point.

mod cli_parser;

use std::process::ExitCode;

use cot_decoding::cli::{self, Command, EXIT_CONFIG_ERROR};
use cot_decoding::telemetry::{init_logging, LogFormat};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging(LogFormat::from_env());

    let args: Vec<String> = std::env::args().collect();
    let command = match cli::parse_args(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            cli_parser::print_usage();
            return ExitCode::from(EXIT_CONFIG_ERROR as u8);
        }
    };

    let code = match command {
        Command::Ask { prompt, options } => cli::run_ask(&prompt, &options).await,
        Command::Chat { file, options } => cli::run_chat(&file, &options).await,
        Command::Config { command, options } => cli::run_config(command, &options),
        Command::Health { options } => cli::run_health(&options).await,
        Command::Help(Some(sub)) => {
            cli_parser::print_command_help(&sub);
            0
        }
        Command::Help(None) => {
            cli_parser::print_usage();
            0
        }
        Command::Version => {
            println!("cot-decode {}", env!("CARGO_PKG_VERSION"));
            0
        }
    };
    ExitCode::from(code as u8)
}
