//! CLI support for the `cot-decode` binary.

pub mod args;
pub mod commands;
pub mod output_format;

pub use args::{parse_args, ArgError, Command, ConfigCommand, DecodeOptions};
pub use commands::{build_overrides, load_conversation, run_ask, run_chat, run_config, run_health};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;
pub const EXIT_CONNECTION_ERROR: i32 = 3;
